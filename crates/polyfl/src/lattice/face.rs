//! Arena node of a face lattice.

use std::collections::BTreeSet;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::geom::Hyperplane;
use crate::scalar::Real;

/// Stable index of a face inside its `FaceLattice`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FaceId(pub usize);

/// A k-dimensional face.
///
/// Invariants:
/// - `vertices` index the owning lattice's vertex table; for `dim >= 1` they
///   are the union of the sub-faces' vertices, and there are at least `dim + 1`.
/// - `subs` are faces of dimension `dim − 1`, `supers` of dimension `dim + 1`.
/// - `plane` is set on facets (one level below the top), oriented outward.
/// - `inner` is the vertex centroid, a relative-interior point used only for
///   orientation arithmetic.
#[derive(Clone, Debug)]
pub struct Face<T: Real> {
    pub dim: usize,
    pub vertices: BTreeSet<usize>,
    pub subs: BTreeSet<FaceId>,
    pub supers: BTreeSet<FaceId>,
    pub plane: Option<Hyperplane<T>>,
    pub inner: DVector<T>,
}
