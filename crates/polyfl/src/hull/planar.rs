//! One- and two-dimensional hulls, the floor of the wrapping recursion.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::cfg::GeomCfg;
use crate::error::GeomError;
use crate::geom::{points_eq, Frame};
use crate::lattice::LatticeDraft;
use crate::scalar::Real;

/// Extreme points of a 1D frame.
pub(crate) fn segment<T: Real>(frame: &Frame<T>, cfg: &GeomCfg<T>) -> Result<LatticeDraft, GeomError> {
    let mut lo = 0usize;
    let mut hi = 0usize;
    for (i, p) in frame.coords.iter().enumerate() {
        if p[0] < frame.coords[lo][0] {
            lo = i;
        }
        if p[0] > frame.coords[hi][0] {
            hi = i;
        }
    }
    if frame.is_empty() || cfg.eq(frame.coords[lo][0], frame.coords[hi][0]) {
        return Err(GeomError::DegenerateInput {
            dim: 1,
            points: frame.len(),
            rank: 0,
        });
    }
    let (a, b) = (frame.ids[lo], frame.ids[hi]);
    let mut draft = LatticeDraft::new();
    let va = draft.vertex(a);
    let vb = draft.vertex(b);
    let e = draft.face(1, BTreeSet::from([a, b]));
    draft.link(va, e);
    draft.link(vb, e);
    Ok(draft)
}

/// Monotone-chain hull of a 2D frame.
///
/// Turns whose distance to the current edge is within `eps` are popped, so
/// collinear and repeated points never become vertices.
pub(crate) fn polygon<T: Real>(frame: &Frame<T>, cfg: &GeomCfg<T>) -> Result<LatticeDraft, GeomError> {
    let pts = &frame.coords;
    let mut order: Vec<usize> = (0..pts.len()).collect();
    order.sort_by(|&a, &b| {
        let (p, q) = (&pts[a], &pts[b]);
        p[0].partial_cmp(&q[0])
            .unwrap_or(Ordering::Equal)
            .then(p[1].partial_cmp(&q[1]).unwrap_or(Ordering::Equal))
            .then(a.cmp(&b))
    });
    order.dedup_by(|a, b| points_eq(&pts[*a], &pts[*b], cfg));

    let turn = |a: usize, b: usize, c: usize| -> bool {
        let ab = &pts[b] - &pts[a];
        let ac = &pts[c] - &pts[a];
        let cross = ab[0] * ac[1] - ab[1] * ac[0];
        cross > cfg.eps * ab.norm()
    };
    let chain = |it: &mut dyn Iterator<Item = usize>| -> Vec<usize> {
        let mut out: Vec<usize> = Vec::with_capacity(order.len());
        for p in it {
            while out.len() >= 2 && !turn(out[out.len() - 2], out[out.len() - 1], p) {
                out.pop();
            }
            out.push(p);
        }
        out
    };
    let mut lower = chain(&mut order.iter().copied());
    let mut upper = chain(&mut order.iter().rev().copied());
    lower.pop();
    upper.pop();
    let mut hull = lower;
    hull.extend(upper);

    if hull.len() < 3 {
        return Err(GeomError::DegenerateInput {
            dim: 2,
            points: order.len(),
            rank: hull.len().saturating_sub(1).min(1),
        });
    }

    let ids: Vec<usize> = hull.iter().map(|&i| frame.ids[i]).collect();
    let mut draft = LatticeDraft::new();
    let vs: Vec<usize> = ids.iter().map(|&id| draft.vertex(id)).collect();
    let top = draft.face(2, ids.iter().copied().collect());
    for i in 0..ids.len() {
        let j = (i + 1) % ids.len();
        let e = draft.face(1, BTreeSet::from([ids[i], ids[j]]));
        draft.link(vs[i], e);
        draft.link(vs[j], e);
        draft.link(e, top);
    }
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{dvector, DVector};

    fn vertex_ids(draft: &LatticeDraft) -> BTreeSet<usize> {
        draft
            .level(0)
            .flat_map(|i| draft.faces[i].verts.iter().copied())
            .collect()
    }

    fn frame(pts: Vec<DVector<f64>>) -> Frame<f64> {
        Frame::root(pts)
    }

    #[test]
    fn segment_picks_the_extremes() {
        let cfg = GeomCfg::default();
        let f = frame(vec![dvector![0.5], dvector![-1.0], dvector![2.0], dvector![0.0]]);
        let d = segment(&f, &cfg).unwrap();
        assert_eq!(vertex_ids(&d), BTreeSet::from([1, 2]));
        assert_eq!(d.top(), d.find(&BTreeSet::from([1, 2])));
    }

    #[test]
    fn polygon_drops_collinear_and_interior_points() {
        let cfg = GeomCfg::default();
        let f = frame(vec![
            dvector![0.0, 0.0],
            dvector![0.5, 0.0],
            dvector![1.0, 0.0],
            dvector![1.0, 1.0],
            dvector![0.5, 0.5],
            dvector![0.0, 1.0],
            dvector![1.0, 1.0 + 1e-12],
        ]);
        let d = polygon(&f, &cfg).unwrap();
        assert_eq!(vertex_ids(&d), BTreeSet::from([0, 2, 3, 5]));
        assert_eq!(d.level(1).count(), 4);
        assert!(d.top().is_some());
    }

    #[test]
    fn collinear_polygon_is_degenerate() {
        let cfg = GeomCfg::default();
        let f = frame(vec![dvector![0.0, 0.0], dvector![1.0, 1.0], dvector![2.0, 2.0]]);
        assert!(matches!(
            polygon(&f, &cfg),
            Err(GeomError::DegenerateInput { dim: 2, .. })
        ));
    }
}
