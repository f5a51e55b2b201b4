//! Oriented hyperplanes.

use nalgebra::DVector;

use super::basis::AffineBasis;
use crate::cfg::GeomCfg;
use crate::scalar::Real;

/// Hyperplane `normal · x = offset` bounding the half-space `normal · x <= offset`.
///
/// Invariants:
/// - `normal` has unit length, so `eval` is a signed distance.
/// - The orientation is outward: once built against a polytope, interior
///   points evaluate negative. `orient_against` fixes it explicitly.
#[derive(Clone, Debug, PartialEq)]
pub struct Hyperplane<T: Real> {
    pub normal: DVector<T>,
    pub offset: T,
}

impl<T: Real> Hyperplane<T> {
    /// Normalizes `(normal, offset)`; `None` for a vanishing normal.
    pub fn new(normal: DVector<T>, offset: T) -> Option<Self> {
        let len = normal.norm();
        if !(len > T::lit(0.0)) {
            return None;
        }
        Some(Self {
            normal: normal / len,
            offset: offset / len,
        })
    }

    /// Plane with normal `normal` through `point`.
    pub fn through_point(normal: DVector<T>, point: &DVector<T>) -> Option<Self> {
        let len = normal.norm();
        if !(len > T::lit(0.0)) {
            return None;
        }
        let normal = normal / len;
        let offset = normal.dot(point);
        Some(Self { normal, offset })
    }

    /// Plane containing the flat `basis`, which must have codimension one.
    pub fn through(basis: &AffineBasis<T>, cfg: &GeomCfg<T>) -> Option<Self> {
        if basis.dim() + 1 != basis.ambient() {
            return None;
        }
        let normal = basis.complement(cfg).into_iter().next()?;
        Self::through_point(normal, basis.origin())
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.normal.len()
    }

    /// Signed distance `normal · p − offset`.
    #[inline]
    pub fn eval(&self, p: &DVector<T>) -> T {
        self.normal.dot(p) - self.offset
    }

    #[inline]
    pub fn contains(&self, p: &DVector<T>, cfg: &GeomCfg<T>) -> bool {
        cfg.is_zero(self.eval(p))
    }

    #[inline]
    pub fn contains_positive(&self, p: &DVector<T>, cfg: &GeomCfg<T>) -> bool {
        cfg.is_pos(self.eval(p))
    }

    #[inline]
    pub fn contains_negative(&self, p: &DVector<T>, cfg: &GeomCfg<T>) -> bool {
        cfg.is_neg(self.eval(p))
    }

    /// Closed half-space membership `eval(p) <= eps`.
    #[inline]
    pub fn satisfies(&self, p: &DVector<T>, cfg: &GeomCfg<T>) -> bool {
        !self.contains_positive(p, cfg)
    }

    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -&self.normal,
            offset: -self.offset,
        }
    }

    /// Flip so that `interior` lies on the negative side.
    pub fn orient_against(&mut self, interior: &DVector<T>) {
        if self.eval(interior) > T::lit(0.0) {
            *self = self.flipped();
        }
    }

    /// Same oriented plane within tolerance.
    pub fn approx_eq(&self, other: &Self, cfg: &GeomCfg<T>) -> bool {
        self.dim() == other.dim()
            && cfg.eq(self.offset, other.offset)
            && self
                .normal
                .iter()
                .zip(other.normal.iter())
                .all(|(a, b)| cfg.eq(*a, *b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dvector;

    #[test]
    fn through_basis_and_orientation() {
        let cfg = GeomCfg::<f64>::default();
        let pts = [dvector![1.0, 0.0, 0.0], dvector![0.0, 1.0, 0.0], dvector![0.0, 0.0, 1.0]];
        let b = AffineBasis::spanning(pts.iter(), &cfg).unwrap();
        let mut h = Hyperplane::through(&b, &cfg).unwrap();
        h.orient_against(&dvector![0.0, 0.0, 0.0]);
        let s = 1.0 / 3.0_f64.sqrt();
        assert!((&h.normal - dvector![s, s, s]).norm() < 1e-12);
        assert!((h.offset - s).abs() < 1e-12);
        for p in &pts {
            assert!(h.contains(p, &cfg));
        }
        assert!(h.contains_negative(&dvector![0.1, 0.1, 0.1], &cfg));
        assert!(h.contains_positive(&dvector![1.0, 1.0, 1.0], &cfg));
    }

    #[test]
    fn new_normalizes_and_rejects_zero() {
        let h = Hyperplane::<f64>::new(dvector![0.0, 2.0], 4.0).unwrap();
        assert!((h.offset - 2.0).abs() < 1e-12);
        assert!(Hyperplane::<f64>::new(dvector![0.0, 0.0], 1.0).is_none());
    }

    #[test]
    fn flipped_is_not_approx_equal() {
        let cfg = GeomCfg::<f64>::default();
        let h = Hyperplane::new(dvector![1.0, 0.0], 1.0).unwrap();
        assert!(h.approx_eq(&h.clone(), &cfg));
        assert!(!h.approx_eq(&h.flipped(), &cfg));
    }
}
