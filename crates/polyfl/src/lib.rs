//! Convex polytopes in arbitrary dimension, represented by face lattices.
//!
//! Representations
//! - Vrep: the vertex table of a `FaceLattice`.
//! - Hrep: outward `Hyperplane`s `n·x <= c` with unit normals.
//! - FLrep: `FaceLattice`, all faces from vertices to the polytope itself,
//!   with sub/super links between consecutive levels.
//!
//! Constructions
//! - `build_hull`: gift wrapping from a point swarm (Vrep → FLrep).
//! - `from_halfspaces`: vertex walk plus face growth (Hrep → FLrep).
//! - `minkowski_sum`: face-lattice sum, optionally producing half-spaces only.
//! - `minkowski_difference`: shrunk half-spaces, `None` when empty.
//!
//! Every construction takes a `GeomCfg` (tolerance and strict mode) by
//! reference; `ConvexPolytope` stores the one it was built with.

pub mod cfg;
pub mod error;
pub mod geom;
pub mod hrep;
pub mod hull;
pub mod lattice;
pub mod minkowski;
pub mod polytope;
pub mod scalar;
pub mod swarm;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cfg::GeomCfg;
pub use error::GeomError;
pub use hrep::from_halfspaces;
pub use hull::build_hull;
pub use lattice::{Face, FaceId, FaceLattice, LatticeRecord};
pub use minkowski::{minkowski_difference, minkowski_sum};
pub use polytope::ConvexPolytope;
pub use scalar::Real;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::geom::{AffineBasis, Hyperplane};
    pub use crate::lattice::{FaceRecord, HalfspaceRecord, LatticeRecord};
    pub use crate::swarm::ReplayToken;
    pub use crate::{
        build_hull, from_halfspaces, minkowski_difference, minkowski_sum, ConvexPolytope, Face, FaceId,
        FaceLattice, GeomCfg, GeomError, Real,
    };
    pub use nalgebra::{DMatrix, DVector};
}
