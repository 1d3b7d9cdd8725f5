use num_traits::{Float, NumCast};

/// Comparison thresholds for floating-point results.
/// 
/// Passed explicitly to whatever needs them; there is no global default
/// that can be changed at runtime.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerance {
    pub tol: f64,
    pub eps: f64,
}

impl Tolerance { 
    pub const DEFAULT_TOL: f64 = 1e-8;
    pub const DEFAULT_EPS: f64 = f64::EPSILON; // 2^-52

    pub fn new(tol: f64, eps: f64) -> Self { 
        Self { tol, eps }
    }

    pub fn with_tol(self, tol: f64) -> Self { 
        Self { tol, ..self }
    }

    /// NaN or infinite.
    pub fn is_uncountable<R: Float>(x: R) -> bool { 
        x.is_nan() || x.is_infinite()
    }

    pub fn approx_eq<R: Float>(&self, a: R, b: R) -> bool { 
        let tol = <R as NumCast>::from(self.tol).unwrap_or_else(R::epsilon);
        (a - b).abs() <= tol
    }

    /// `tol` scaled by the magnitude of the operands, with `eps` as a floor
    /// so that comparisons near zero stay meaningful.
    pub fn approx_eq_rel<R: Float>(&self, a: R, b: R) -> bool { 
        let tol = <R as NumCast>::from(self.tol).unwrap_or_else(R::epsilon);
        let eps = <R as NumCast>::from(self.eps).unwrap_or_else(R::epsilon);
        let scale = a.abs().max(b.abs()).max(R::one());
        (a - b).abs() <= (tol * scale).max(eps)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TOL, Self::DEFAULT_EPS)
    }
}
