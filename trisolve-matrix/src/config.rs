/// Options for the solvers that have a choice in how they run.
/// 
/// Numerical results never depend on these options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config { 
    pub multithread: bool
}

impl Config { 
    pub fn serial() -> Self { 
        Self { multithread: false }
    }

    pub fn is_multithread_enabled(&self) -> bool { 
        cfg!(feature = "multithread") && self.multithread
    }
}

impl Default for Config { 
    fn default() -> Self {
        Self { multithread: cfg!(feature = "multithread") }
    }
}
