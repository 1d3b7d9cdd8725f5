mod real;
mod tol;
mod err;

pub use real::*;
pub use tol::*;
pub use err::*;

pub mod util;
