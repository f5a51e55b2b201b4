//! Tolerance context.
//!
//! One `GeomCfg` is read for the whole of a construction: hull building, the
//! half-space converter and the Minkowski operations all take it by reference,
//! and `ConvexPolytope` stores the one it was built with so lazy views use the
//! same tolerance.

use serde::{Deserialize, Serialize};

use crate::scalar::Real;

/// Geometry configuration.
///
/// - `eps`: absolute tolerance for point equality, plane membership, rank
///   decisions and tie detection. Inputs are assumed to be of order one.
/// - `strict`: report ambiguous ties (`GeomError::AmbiguousTie`) instead of
///   resolving them by enumeration order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeomCfg<T> {
    pub eps: T,
    pub strict: bool,
}

impl<T: Real> Default for GeomCfg<T> {
    fn default() -> Self {
        Self {
            eps: T::lit(T::DEFAULT_EPS),
            strict: false,
        }
    }
}

impl<T: Real> GeomCfg<T> {
    #[inline]
    pub fn new(eps: T) -> Self {
        Self { eps, strict: false }
    }

    #[inline]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    #[inline]
    pub fn is_zero(&self, x: T) -> bool {
        x.abs() <= self.eps
    }

    #[inline]
    pub fn is_pos(&self, x: T) -> bool {
        x > self.eps
    }

    #[inline]
    pub fn is_neg(&self, x: T) -> bool {
        x < -self.eps
    }

    #[inline]
    pub fn eq(&self, a: T, b: T) -> bool {
        (a - b).abs() <= self.eps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_predicates_respect_eps() {
        let cfg = GeomCfg::<f64>::new(1e-6);
        assert!(cfg.is_zero(5e-7));
        assert!(!cfg.is_pos(5e-7));
        assert!(cfg.is_neg(-2e-6));
        assert!(cfg.eq(1.0, 1.0 + 1e-7));
        assert!(!cfg.strict);
        assert!(cfg.strict().strict);
    }
}
