//! Geometric Minkowski difference `A ⊖ B = {x : x + B ⊆ A}`.

use tracing::debug;

use crate::error::GeomError;
use crate::geom::Hyperplane;
use crate::hrep::{first_vertex, from_halfspaces};
use crate::polytope::ConvexPolytope;
use crate::scalar::Real;

/// `A ⊖ B`, or `None` when it has no interior.
///
/// Each facet half-space `n·x <= c` of A is shrunk to
/// `n·x <= c − max_{b ∈ V(B)} n·b`. A flat A, or a shrunk system that is
/// empty or thinner than `20·eps`, yields `None`.
pub fn minkowski_difference<T: Real>(
    a: &ConvexPolytope<T>,
    b: &ConvexPolytope<T>,
) -> Result<Option<ConvexPolytope<T>>, GeomError> {
    let cfg = a.cfg();
    let n = a.ambient();
    if b.ambient() != n {
        return Err(GeomError::DimensionMismatch {
            expected: n,
            found: b.ambient(),
        });
    }
    let verts = b.vertices()?;
    let mut shrunk: Vec<Hyperplane<T>> = Vec::with_capacity(a.halfspaces()?.len());
    for h in a.halfspaces()? {
        let reach = verts
            .iter()
            .map(|v| h.normal.dot(v))
            .fold(None, |acc: Option<T>, s| Some(acc.map_or(s, |m| m.max(s))));
        let Some(reach) = reach else {
            return Err(GeomError::malformed("subtrahend has no vertices"));
        };
        shrunk.push(Hyperplane {
            normal: h.normal.clone(),
            offset: h.offset - reach,
        });
    }

    let margin = cfg.eps * T::lit(10.0);
    let tightened: Vec<Hyperplane<T>> = shrunk
        .iter()
        .map(|h| Hyperplane {
            normal: h.normal.clone(),
            offset: h.offset - margin,
        })
        .collect();
    if first_vertex(&tightened, n, cfg).is_none() {
        debug!(ambient = n, halfspaces = shrunk.len(), "minkowski difference is empty");
        return Ok(None);
    }

    match from_halfspaces(&shrunk, n, cfg) {
        Ok(lattice) if lattice.dim() == n => Ok(Some(ConvexPolytope::from_lattice(lattice, *cfg))),
        Ok(_) | Err(GeomError::InfeasibleSystem { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}
