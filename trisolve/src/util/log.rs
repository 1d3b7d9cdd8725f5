use log::SetLoggerError;
use simplelog::*;

fn config() -> Config { 
    let mut cb = ConfigBuilder::new();
    cb.set_location_level(LevelFilter::Off);
    cb.set_target_level(LevelFilter::Off);
    cb.set_thread_level(LevelFilter::Off);
    cb.set_level_color(Level::Trace, Some(Color::Green));
    cb.build()
}

pub fn init_simple_logger(l: LevelFilter) -> Result<(), SetLoggerError> { 
    TermLogger::init(
        l,
        config(),
        TerminalMode::Mixed,
        ColorChoice::Auto
    )
}

// Tests share one process, so a second init is expected and ignored.
pub fn init_test_logger(l: LevelFilter) { 
    let _ = TestLogger::init(l, config());
}
