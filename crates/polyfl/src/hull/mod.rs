//! Convex hull of a point swarm as a face lattice.

mod planar;
mod wrap;

#[cfg(test)]
mod tests;

use nalgebra::DVector;
use tracing::debug;

use crate::cfg::GeomCfg;
use crate::error::GeomError;
use crate::geom::{dedup_points, AffineBasis, Frame};
use crate::lattice::FaceLattice;
use crate::scalar::Real;

/// Face lattice of the convex hull of `points`.
///
/// Repeated points (within `eps`) are dropped, first occurrence kept. The
/// points must span their ambient space; the vertex table of the result holds
/// the extreme points only.
pub fn build_hull<T: Real>(points: &[DVector<T>], cfg: &GeomCfg<T>) -> Result<FaceLattice<T>, GeomError> {
    let Some(first) = points.first() else {
        return Err(GeomError::UnsupportedDimension {
            op: "hull of an empty swarm",
            dim: 0,
        });
    };
    let dim = first.len();
    if dim == 0 {
        return Err(GeomError::UnsupportedDimension { op: "hull", dim });
    }
    if let Some(bad) = points.iter().find(|p| p.len() != dim) {
        return Err(GeomError::DimensionMismatch {
            expected: dim,
            found: bad.len(),
        });
    }

    let kept: Vec<DVector<T>> = dedup_points(points, cfg)
        .into_iter()
        .map(|i| points[i].clone())
        .collect();
    let rank = AffineBasis::spanning(kept.iter(), cfg).map_or(0, |b| b.dim());
    if rank < dim {
        return Err(GeomError::DegenerateInput {
            dim,
            points: kept.len(),
            rank,
        });
    }

    let frame = Frame::root(kept);
    let draft = wrap::hull_of(&frame, cfg)?;
    let lattice = FaceLattice::from_draft(&draft, |i| frame.coords[i].clone(), dim, cfg)?;
    debug!(
        dim,
        points = points.len(),
        vertices = lattice.vertices().len(),
        facets = lattice.facets().len(),
        "hull built"
    );
    Ok(lattice)
}
