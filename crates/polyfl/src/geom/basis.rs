//! Orthonormal affine bases and local-coordinate frames.
//!
//! A `Frame` is one step of dimension reduction: points of a lower-dimensional
//! flat expressed in that flat's own coordinates, each remembering the swarm
//! index it descends from. Mapping a vertex found deep in a recursion back to
//! the original space is a lookup by that index, never a re-lift.

use nalgebra::DVector;

use crate::cfg::GeomCfg;
use crate::scalar::Real;

/// Affine flat `origin + span(dirs)` with orthonormal `dirs`.
#[derive(Clone, Debug)]
pub struct AffineBasis<T: Real> {
    origin: DVector<T>,
    dirs: Vec<DVector<T>>,
}

impl<T: Real> AffineBasis<T> {
    /// Zero-dimensional flat at `origin`.
    pub fn new(origin: DVector<T>) -> Self {
        Self {
            origin,
            dirs: Vec::new(),
        }
    }

    /// Linear subspace (flat through zero) in `ambient` dimensions.
    pub fn linear(ambient: usize) -> Self {
        Self::new(DVector::zeros(ambient))
    }

    /// Affine hull of `points` (origin at the first point).
    pub fn spanning<'a, I>(points: I, cfg: &GeomCfg<T>) -> Option<Self>
    where
        I: IntoIterator<Item = &'a DVector<T>>,
    {
        let mut it = points.into_iter();
        let mut basis = Self::new(it.next()?.clone());
        for p in it {
            basis.push_point(p, cfg);
        }
        Some(basis)
    }

    #[inline]
    pub fn ambient(&self) -> usize {
        self.origin.len()
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dirs.len()
    }

    #[inline]
    pub fn origin(&self) -> &DVector<T> {
        &self.origin
    }

    #[inline]
    pub fn dirs(&self) -> &[DVector<T>] {
        &self.dirs
    }

    /// Component of the direction `v` orthogonal to the flat.
    pub fn residual(&self, v: &DVector<T>) -> DVector<T> {
        let mut r = v.clone();
        // Two passes of modified Gram-Schmidt keep the result orthogonal even
        // when `v` is nearly inside the span.
        for _ in 0..2 {
            for d in &self.dirs {
                let c = d.dot(&r);
                r -= d * c;
            }
        }
        r
    }

    /// Extend by the direction `v`; false if `v` is (numerically) inside the span.
    pub fn push_dir(&mut self, v: &DVector<T>, cfg: &GeomCfg<T>) -> bool {
        if self.dirs.len() >= self.ambient() {
            return false;
        }
        let r = self.residual(v);
        let len = r.norm();
        if len <= cfg.eps {
            return false;
        }
        self.dirs.push(r / len);
        true
    }

    /// Extend by the point `p`; false if `p` already lies on the flat.
    #[inline]
    pub fn push_point(&mut self, p: &DVector<T>, cfg: &GeomCfg<T>) -> bool {
        let v = p - &self.origin;
        self.push_dir(&v, cfg)
    }

    /// Local coordinates of `p` (orthogonal projection onto the flat).
    pub fn project(&self, p: &DVector<T>) -> DVector<T> {
        let v = p - &self.origin;
        DVector::from_fn(self.dirs.len(), |i, _| self.dirs[i].dot(&v))
    }

    /// Ambient coordinates of local coordinates `local`.
    pub fn lift(&self, local: &DVector<T>) -> DVector<T> {
        let mut out = self.origin.clone();
        for (d, c) in self.dirs.iter().zip(local.iter()) {
            out += d * *c;
        }
        out
    }

    #[inline]
    pub fn contains(&self, p: &DVector<T>, cfg: &GeomCfg<T>) -> bool {
        let v = p - &self.origin;
        self.residual(&v).norm() <= cfg.eps
    }

    /// Orthonormal basis of the orthogonal complement of the span.
    ///
    /// Coordinate axes are tried in order, so the result is deterministic.
    pub fn complement(&self, cfg: &GeomCfg<T>) -> Vec<DVector<T>> {
        let n = self.ambient();
        let mut all = self.clone();
        let mut out = Vec::with_capacity(n - self.dim());
        for axis in 0..n {
            if all.dim() == n {
                break;
            }
            let mut e = DVector::zeros(n);
            e[axis] = T::lit(1.0);
            if all.push_dir(&e, cfg) {
                if let Some(last) = all.dirs.last() {
                    out.push(last.clone());
                }
            }
        }
        out
    }

    /// Unit direction in `span(outer)` orthogonal to this flat's span.
    ///
    /// Picks the `outer` direction with the largest residual; `None` when
    /// `outer` adds nothing.
    pub fn normal_within(&self, outer: &AffineBasis<T>, cfg: &GeomCfg<T>) -> Option<DVector<T>> {
        let mut best: Option<(T, DVector<T>)> = None;
        for d in outer.dirs() {
            let r = self.residual(d);
            let len = r.norm();
            if len > cfg.eps && best.as_ref().map_or(true, |(b, _)| len > *b) {
                best = Some((len, r));
            }
        }
        best.map(|(len, r)| r / len)
    }
}

/// Points of one flat in local coordinates, with their originating swarm ids.
#[derive(Clone, Debug)]
pub struct Frame<T: Real> {
    pub coords: Vec<DVector<T>>,
    pub ids: Vec<usize>,
}

impl<T: Real> Frame<T> {
    /// Top-level frame: ids are positions in `points`.
    pub fn root(points: Vec<DVector<T>>) -> Self {
        let ids = (0..points.len()).collect();
        Self { coords: points, ids }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Dimension of the coordinates (not of the affine hull).
    #[inline]
    pub fn dim(&self) -> usize {
        self.coords.first().map_or(0, |p| p.len())
    }

    /// Frame index of the swarm id `id`.
    pub fn position(&self, id: usize) -> Option<usize> {
        self.ids.iter().position(|&x| x == id)
    }

    /// Sub-frame of the members `members` (frame indices), re-expressed in the
    /// coordinates of their own affine hull.
    pub fn restrict(&self, members: &[usize], cfg: &GeomCfg<T>) -> Self {
        let basis = AffineBasis::spanning(members.iter().map(|&i| &self.coords[i]), cfg);
        let Some(basis) = basis else {
            return Self {
                coords: Vec::new(),
                ids: Vec::new(),
            };
        };
        Self {
            coords: members.iter().map(|&i| basis.project(&self.coords[i])).collect(),
            ids: members.iter().map(|&i| self.ids[i]).collect(),
        }
    }
}
