#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub struct Error { 
    pub msg: String
}

impl Error { 
    pub fn new<S: Into<String>>(msg: S) -> Self { 
        Self { msg: msg.into() }
    }
}

impl std::error::Error for Error {}

#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {{
        let e = $crate::Error{ msg: format!($($arg)*) };
        Err( e.into() )
    }}
}

#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($arg:tt)*) => {{
        if !$cond { 
            return $crate::err!($($arg)*);
        }
    }}
}
