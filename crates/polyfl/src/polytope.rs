//! Convex polytope value type with lazy V/H/lattice views.
//!
//! A polytope is built either with its face lattice (from points, from
//! half-spaces, from a lattice) or, for `hrep_only` sums, with half-spaces
//! alone. The missing views are derived on first use and cached; the value is
//! immutable after construction.

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use nalgebra::DVector;

use crate::cfg::GeomCfg;
use crate::error::GeomError;
use crate::geom::Hyperplane;
use crate::hrep;
use crate::hull::build_hull;
use crate::lattice::{FaceId, FaceLattice};
use crate::minkowski;
use crate::scalar::Real;

#[derive(Clone, Debug)]
pub struct ConvexPolytope<T: Real> {
    ambient: usize,
    cfg: GeomCfg<T>,
    lattice: OnceCell<FaceLattice<T>>,
    hrep: OnceCell<Vec<Hyperplane<T>>>,
}

impl<T: Real> ConvexPolytope<T> {
    /// Convex hull of a full-dimensional swarm.
    pub fn from_points(points: Vec<DVector<T>>, cfg: GeomCfg<T>) -> Result<Self, GeomError> {
        let lattice = build_hull(&points, &cfg)?;
        Ok(Self::from_lattice(lattice, cfg))
    }

    /// Bounded intersection of half-spaces `n·x <= c`.
    pub fn from_halfspaces(hs: Vec<Hyperplane<T>>, dim: usize, cfg: GeomCfg<T>) -> Result<Self, GeomError> {
        let lattice = hrep::from_halfspaces(&hs, dim, &cfg)?;
        Ok(Self::from_lattice(lattice, cfg))
    }

    pub fn from_lattice(lattice: FaceLattice<T>, cfg: GeomCfg<T>) -> Self {
        Self {
            ambient: lattice.ambient(),
            cfg,
            lattice: OnceCell::from(lattice),
            hrep: OnceCell::new(),
        }
    }

    /// Half-spaces only; the lattice is computed on demand.
    pub(crate) fn from_hrep(ambient: usize, hs: Vec<Hyperplane<T>>, cfg: GeomCfg<T>) -> Self {
        Self {
            ambient,
            cfg,
            lattice: OnceCell::new(),
            hrep: OnceCell::from(hs),
        }
    }

    #[inline]
    pub fn ambient(&self) -> usize {
        self.ambient
    }

    #[inline]
    pub fn cfg(&self) -> &GeomCfg<T> {
        &self.cfg
    }

    /// True while only the half-space view exists.
    #[inline]
    pub fn is_hrep_only(&self) -> bool {
        self.lattice.get().is_none()
    }

    pub fn lattice(&self) -> Result<&FaceLattice<T>, GeomError> {
        if let Some(l) = self.lattice.get() {
            return Ok(l);
        }
        let hs = self
            .hrep
            .get()
            .ok_or_else(|| GeomError::malformed("polytope has neither lattice nor half-spaces"))?;
        let built = hrep::from_halfspaces(hs, self.ambient, &self.cfg)?;
        Ok(self.lattice.get_or_init(|| built))
    }

    /// Vrep.
    pub fn vertices(&self) -> Result<&[DVector<T>], GeomError> {
        Ok(self.lattice()?.vertices())
    }

    /// Hrep: facet half-spaces, plus equality pairs when the polytope is flat.
    pub fn halfspaces(&self) -> Result<&[Hyperplane<T>], GeomError> {
        if let Some(hs) = self.hrep.get() {
            return Ok(hs);
        }
        let hs = self.lattice()?.facet_halfspaces(&self.cfg);
        Ok(self.hrep.get_or_init(|| hs))
    }

    pub fn dim(&self) -> Result<usize, GeomError> {
        Ok(self.lattice()?.dim())
    }

    pub fn contains(&self, p: &DVector<T>) -> Result<bool, GeomError> {
        if p.len() != self.ambient {
            return Err(GeomError::DimensionMismatch {
                expected: self.ambient,
                found: p.len(),
            });
        }
        Ok(self.halfspaces()?.iter().all(|h| h.satisfies(p, &self.cfg)))
    }

    /// `self ⊕ other` with this polytope's tolerance.
    pub fn minkowski_sum(&self, other: &Self, hrep_only: bool) -> Result<Self, GeomError> {
        minkowski::minkowski_sum(self.lattice()?, other.lattice()?, hrep_only, &self.cfg)
    }

    /// `self ⊖ other`; `None` when empty or without interior.
    pub fn minkowski_difference(&self, other: &Self) -> Result<Option<Self>, GeomError> {
        minkowski::minkowski_difference(self, other)
    }

    /// OFF mesh of a full-dimensional 3D polytope.
    ///
    /// Facets list their vertices counter-clockwise seen from outside.
    pub fn to_off(&self) -> Result<String, GeomError> {
        let lat = self.lattice()?;
        if self.ambient != 3 || lat.dim() != 3 {
            let dim = if self.ambient != 3 { self.ambient } else { lat.dim() };
            return Err(GeomError::UnsupportedDimension { op: "OFF export", dim });
        }
        let mut out = String::new();
        let _ = writeln!(out, "OFF");
        let _ = writeln!(
            out,
            "{} {} {}",
            lat.vertices().len(),
            lat.facets().len(),
            lat.level(1).len()
        );
        for v in lat.vertices() {
            let _ = writeln!(out, "{} {} {}", v[0].as_f64(), v[1].as_f64(), v[2].as_f64());
        }
        for &f in lat.facets() {
            let cycle = facet_cycle(lat, f)?;
            let _ = write!(out, "{}", cycle.len());
            for v in cycle {
                let _ = write!(out, " {v}");
            }
            let _ = writeln!(out);
        }
        Ok(out)
    }
}

/// Boundary walk of a 3D facet, counter-clockwise around its outward normal.
fn facet_cycle<T: Real>(lat: &FaceLattice<T>, facet: FaceId) -> Result<Vec<usize>, GeomError> {
    let face = lat.face(facet);
    let mut nbrs: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for e in &face.subs {
        let ends: Vec<usize> = lat.face(*e).vertices.iter().copied().collect();
        if let [a, b] = ends[..] {
            nbrs.entry(a).or_default().push(b);
            nbrs.entry(b).or_default().push(a);
        }
    }
    let broken = || GeomError::malformed(format!("facet {} is not a polygon", facet.0));
    let start = *face.vertices.iter().next().ok_or_else(broken)?;
    let mut cycle = vec![start];
    let mut prev = start;
    let mut cur = *nbrs.get(&start).and_then(|n| n.first()).ok_or_else(broken)?;
    while cur != start {
        if cycle.len() > face.vertices.len() {
            return Err(broken());
        }
        cycle.push(cur);
        let next = match nbrs.get(&cur).map(|n| n.as_slice()) {
            Some([a, b]) => {
                if *a == prev {
                    *b
                } else {
                    *a
                }
            }
            _ => return Err(broken()),
        };
        prev = cur;
        cur = next;
    }

    // Newell normal of the walk against the facet's outward normal
    let pts: Vec<&DVector<T>> = cycle.iter().map(|&v| lat.vertex(v)).collect();
    let mut newell = DVector::<T>::zeros(3);
    for i in 0..pts.len() {
        let (a, b) = (pts[i], pts[(i + 1) % pts.len()]);
        newell[0] += (a[1] - b[1]) * (a[2] + b[2]);
        newell[1] += (a[2] - b[2]) * (a[0] + b[0]);
        newell[2] += (a[0] - b[0]) * (a[1] + b[1]);
    }
    if let Some(plane) = &face.plane {
        if newell.dot(&plane.normal) < T::lit(0.0) {
            cycle.reverse();
        }
    }
    Ok(cycle)
}
