//! Geometric primitives in arbitrary dimension.
//!
//! - `point`: tolerant equality, lexicographic order, dedup, centroids.
//! - `basis`: orthonormal affine bases and local-coordinate frames.
//! - `plane`: oriented hyperplanes `normal·x = offset` (outward normal).
//! - `util`: combinations and small linear solves.

mod basis;
mod plane;
mod point;
pub(crate) mod util;

pub use basis::{AffineBasis, Frame};
pub use plane::Hyperplane;
pub use point::{centroid, dedup_points, find_point, lex_cmp, lex_min_index, points_eq};
