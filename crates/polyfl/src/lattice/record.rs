//! Serializable form of a face lattice.
//!
//! Coordinates are stored as `f64` regardless of the scalar type; faces refer
//! to their sub-faces by index into the level below.

use std::collections::BTreeSet;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use super::{FaceLattice, LatticeDraft};
use crate::cfg::GeomCfg;
use crate::error::GeomError;
use crate::geom::Hyperplane;
use crate::scalar::Real;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceRecord {
    pub vertices: Vec<usize>,
    pub subs: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatticeRecord {
    pub ambient: usize,
    pub vertices: Vec<Vec<f64>>,
    pub levels: Vec<Vec<FaceRecord>>,
}

/// `normal · x <= offset`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HalfspaceRecord {
    pub normal: Vec<f64>,
    pub offset: f64,
}

impl<T: Real> From<&Hyperplane<T>> for HalfspaceRecord {
    fn from(h: &Hyperplane<T>) -> Self {
        Self {
            normal: h.normal.iter().map(|x| x.as_f64()).collect(),
            offset: h.offset.as_f64(),
        }
    }
}

impl HalfspaceRecord {
    /// `None` for a zero normal.
    pub fn to_hyperplane<T: Real>(&self) -> Option<Hyperplane<T>> {
        let normal = DVector::from_iterator(self.normal.len(), self.normal.iter().map(|&x| T::lit(x)));
        Hyperplane::new(normal, T::lit(self.offset))
    }
}

impl<T: Real> FaceLattice<T> {
    pub fn to_record(&self) -> LatticeRecord {
        let position = |id: super::FaceId, k: usize| self.levels[k].iter().position(|&f| f == id);
        let levels = self
            .levels
            .iter()
            .enumerate()
            .map(|(k, level)| {
                level
                    .iter()
                    .map(|&id| {
                        let f = &self.faces[id.0];
                        let subs = if k == 0 {
                            Vec::new()
                        } else {
                            f.subs.iter().filter_map(|&s| position(s, k - 1)).collect()
                        };
                        FaceRecord {
                            vertices: f.vertices.iter().copied().collect(),
                            subs,
                        }
                    })
                    .collect()
            })
            .collect();
        LatticeRecord {
            ambient: self.ambient,
            vertices: self
                .vertices
                .iter()
                .map(|v| v.iter().map(|x| x.as_f64()).collect())
                .collect(),
            levels,
        }
    }

    /// Rebuild and validate a lattice from its record.
    pub fn from_record(rec: &LatticeRecord, cfg: &GeomCfg<T>) -> Result<Self, GeomError> {
        let mut draft = LatticeDraft::new();
        let mut below: Vec<usize> = Vec::new();
        for (k, level) in rec.levels.iter().enumerate() {
            let mut here = Vec::with_capacity(level.len());
            for face in level {
                if face.vertices.iter().any(|&v| v >= rec.vertices.len()) {
                    return Err(GeomError::malformed(format!("{k}-face refers to a missing vertex")));
                }
                let verts: BTreeSet<usize> = face.vertices.iter().copied().collect();
                if draft.find(&verts).is_some() {
                    return Err(GeomError::malformed(format!("duplicate {k}-face {verts:?}")));
                }
                let j = draft.face(k, verts);
                for &s in &face.subs {
                    let sub = below
                        .get(s)
                        .copied()
                        .ok_or_else(|| GeomError::malformed(format!("{k}-face refers to missing sub-face {s}")))?;
                    draft.link(sub, j);
                }
                here.push(j);
            }
            below = here;
        }
        if let Some(bad) = rec.vertices.iter().find(|v| v.len() != rec.ambient) {
            return Err(GeomError::DimensionMismatch {
                expected: rec.ambient,
                found: bad.len(),
            });
        }
        let coords = |i: usize| DVector::from_iterator(rec.ambient, rec.vertices[i].iter().map(|&x| T::lit(x)));
        let lattice = Self::from_draft(&draft, coords, rec.ambient, cfg)?;
        if lattice.vertices.len() != rec.vertices.len() {
            return Err(GeomError::malformed("vertex table and level 0 disagree"));
        }
        lattice.validate()?;
        Ok(lattice)
    }
}
