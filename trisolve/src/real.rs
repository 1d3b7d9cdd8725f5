use std::fmt::{Debug, Display};
use num_traits::Float;

/// Scalar type the solvers operate on (`f32`, `f64`).
pub trait Real: Float + Debug + Display + Send + Sync + 'static {}

impl<T> Real for T
where T: Float + Debug + Display + Send + Sync + 'static {}

#[cfg(test)]
mod tests { 
    use super::*;

    fn half<R: Real>(x: R) -> R { 
        x / (R::one() + R::one())
    }

    #[test]
    fn f32_and_f64() { 
        assert_eq!(half(3.0_f64), 1.5);
        assert_eq!(half(3.0_f32), 1.5);
    }
}
