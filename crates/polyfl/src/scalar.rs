//! Numeric backends.
//!
//! Every algorithm in the crate is generic over `T: Real`. The trait adds the
//! two conversions nalgebra's `RealField` does not give us directly: literals
//! from `f64` (tolerances, constants) and lossy export to `f64` (reporting,
//! serialization).

use nalgebra::RealField;

/// Real-number type usable by the polytope algorithms.
///
/// Arithmetic, ordering, `sqrt` and trigonometry come from `RealField`.
pub trait Real: RealField + Copy {
    /// Tolerance used by `GeomCfg::default()` for this backend.
    const DEFAULT_EPS: f64;

    /// Convert an `f64` literal into this type.
    fn lit(x: f64) -> Self;

    /// Convert to `f64` (may round).
    fn as_f64(self) -> f64;
}

impl Real for f64 {
    const DEFAULT_EPS: f64 = 1e-9;

    #[inline]
    fn lit(x: f64) -> Self {
        x
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self
    }
}

impl Real for f32 {
    const DEFAULT_EPS: f64 = 1e-4;

    #[inline]
    fn lit(x: f64) -> Self {
        x as f32
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self as f64
    }
}
