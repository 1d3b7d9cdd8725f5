mod base;
mod config;

pub use base::*;
pub use config::*;

pub mod dense;
