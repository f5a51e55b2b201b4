//! Minkowski sum on face lattices.
//!
//! Every face of `P ⊕ Q` is `x ⊕ y` for a unique pair of faces `x ∈ P`,
//! `y ∈ Q`: the faces maximizing a common direction. Starting from the pair
//! of tops, each node `z = (x, y)` of dimension k looks at pairs of faces
//! below `x` and `y` whose sum spans k − 1 dimensions and keeps those whose
//! normal inside `z` is maximized on exactly that pair.

use std::collections::{BTreeSet, HashMap};

use nalgebra::DVector;
use tracing::debug;

use crate::cfg::GeomCfg;
use crate::error::GeomError;
use crate::geom::{AffineBasis, Hyperplane};
use crate::lattice::{FaceId, FaceLattice, LatticeDraft};
use crate::polytope::ConvexPolytope;
use crate::scalar::Real;

/// Face of the sum, keyed by its generating pair.
struct SumNode<T: Real> {
    x: FaceId,
    y: FaceId,
    dim: usize,
    subs: BTreeSet<usize>,
    /// Outward normal and a point on the face; kept for facets only.
    support: Option<(DVector<T>, DVector<T>)>,
}

struct SumBuilder<'a, T: Real> {
    p: &'a FaceLattice<T>,
    q: &'a FaceLattice<T>,
    cfg: &'a GeomCfg<T>,
    nodes: Vec<SumNode<T>>,
    memo: HashMap<(FaceId, FaceId), usize>,
    levels: Vec<Vec<usize>>,
}

/// `P ⊕ Q`; with `hrep_only` the result holds only its facet half-spaces.
pub fn minkowski_sum<T: Real>(
    p: &FaceLattice<T>,
    q: &FaceLattice<T>,
    hrep_only: bool,
    cfg: &GeomCfg<T>,
) -> Result<ConvexPolytope<T>, GeomError> {
    let n = p.ambient();
    if q.ambient() != n {
        return Err(GeomError::DimensionMismatch {
            expected: n,
            found: q.ambient(),
        });
    }
    let span = sum_span(p, q, cfg);
    let d = span.dim();
    debug!(ambient = n, dim = d, hrep_only, "minkowski sum");

    if d == 0 {
        let point = span.origin().clone();
        if hrep_only {
            return Ok(ConvexPolytope::from_hrep(n, pinned(&span, cfg), *cfg));
        }
        let mut draft = LatticeDraft::new();
        draft.vertex(0);
        let lattice = FaceLattice::from_draft(&draft, |_| point.clone(), n, cfg)?;
        return Ok(ConvexPolytope::from_lattice(lattice, *cfg));
    }

    let mut builder = SumBuilder {
        p,
        q,
        cfg,
        nodes: Vec::new(),
        memo: HashMap::new(),
        levels: vec![Vec::new(); d + 1],
    };
    builder.insert(p.top(), q.top(), d, None);
    let floor = if hrep_only { d } else { 1 };
    for k in (floor..=d).rev() {
        let level = builder.levels[k].clone();
        for z in level {
            builder.expand(z, k == d);
        }
    }

    if hrep_only {
        let mut hs: Vec<Hyperplane<T>> = builder.levels[d - 1]
            .iter()
            .filter_map(|&i| builder.nodes[i].support.as_ref())
            .filter_map(|(eta, at)| Hyperplane::through_point(eta.clone(), at))
            .collect();
        hs.extend(pinned(&span, cfg));
        debug!(facets = hs.len(), "minkowski sum half-spaces");
        return Ok(ConvexPolytope::from_hrep(n, hs, *cfg));
    }

    let lattice = builder.assemble(n)?;
    debug!(counts = ?lattice.face_counts(), "minkowski sum lattice");
    Ok(ConvexPolytope::from_lattice(lattice, *cfg))
}

/// Affine hull of `P ⊕ Q`: origin `p0 + q0`, directions of both summands.
fn sum_span<T: Real>(p: &FaceLattice<T>, q: &FaceLattice<T>, cfg: &GeomCfg<T>) -> AffineBasis<T> {
    pair_span(p, q, p.top(), q.top(), cfg)
}

fn pair_span<T: Real>(
    p: &FaceLattice<T>,
    q: &FaceLattice<T>,
    x: FaceId,
    y: FaceId,
    cfg: &GeomCfg<T>,
) -> AffineBasis<T> {
    let xs: Vec<&DVector<T>> = p.face_points(x).collect();
    let ys: Vec<&DVector<T>> = q.face_points(y).collect();
    let x0 = xs[0];
    let y0 = ys[0];
    let mut span = AffineBasis::new(x0 + y0);
    for v in &xs[1..] {
        span.push_dir(&(*v - x0), cfg);
    }
    for u in &ys[1..] {
        span.push_dir(&(*u - y0), cfg);
    }
    span
}

/// Equality pairs pinning the directions missing from `span`.
fn pinned<T: Real>(span: &AffineBasis<T>, cfg: &GeomCfg<T>) -> Vec<Hyperplane<T>> {
    let mut out = Vec::new();
    for u in span.complement(cfg) {
        if let Some(h) = Hyperplane::through_point(u, span.origin()) {
            out.push(h.flipped());
            out.push(h);
        }
    }
    out
}

/// Vertices of `face` where `eta` is maximal (within tolerance).
fn argmax<T: Real>(lat: &FaceLattice<T>, face: FaceId, eta: &DVector<T>, cfg: &GeomCfg<T>) -> BTreeSet<usize> {
    let f = lat.face(face);
    let vals: Vec<(usize, T)> = f.vertices.iter().map(|&v| (v, eta.dot(lat.vertex(v)))).collect();
    let top = vals
        .iter()
        .map(|(_, s)| *s)
        .fold(None, |acc: Option<T>, s| Some(acc.map_or(s, |a| a.max(s))));
    let Some(top) = top else {
        return BTreeSet::new();
    };
    vals.into_iter()
        .filter(|(_, s)| *s >= top - cfg.eps)
        .map(|(v, _)| v)
        .collect()
}

impl<T: Real> SumBuilder<'_, T> {
    fn insert(&mut self, x: FaceId, y: FaceId, dim: usize, support: Option<(DVector<T>, DVector<T>)>) -> usize {
        let id = self.nodes.len();
        self.nodes.push(SumNode {
            x,
            y,
            dim,
            subs: BTreeSet::new(),
            support,
        });
        self.memo.insert((x, y), id);
        self.levels[dim].push(id);
        id
    }

    /// Find the (k−1)-faces of node `z`.
    fn expand(&mut self, z: usize, is_top: bool) {
        let (p, q, cfg) = (self.p, self.q, self.cfg);
        let (x, y, k) = (self.nodes[z].x, self.nodes[z].y, self.nodes[z].dim);
        let span_z = pair_span(p, q, x, y, cfg);
        let inner_z = &p.face(x).inner + &q.face(y).inner;

        let mut cands: Vec<(FaceId, FaceId, usize)> = Vec::new();
        for xi in p.descendants(x) {
            for yj in q.descendants(y) {
                let s = p.face(xi).dim + q.face(yj).dim;
                if (xi, yj) != (x, y) && s + 1 >= k {
                    cands.push((xi, yj, s));
                }
            }
        }
        cands.sort_by(|a, b| b.2.cmp(&a.2));

        for (xi, yj, _) in cands {
            if let Some(&w) = self.memo.get(&(xi, yj)) {
                if self.nodes[w].dim + 1 == k {
                    self.nodes[z].subs.insert(w);
                }
                continue;
            }
            let span_w = pair_span(p, q, xi, yj, cfg);
            if span_w.dim() + 1 != k {
                continue;
            }
            let Some(mut eta) = span_w.normal_within(&span_z, cfg) else {
                continue;
            };
            let inner_w = &p.face(xi).inner + &q.face(yj).inner;
            if eta.dot(&(&inner_z - &inner_w)) > T::lit(0.0) {
                eta = -eta;
            }
            if argmax(p, x, &eta, cfg) != p.face(xi).vertices || argmax(q, y, &eta, cfg) != q.face(yj).vertices {
                continue;
            }
            let support = is_top.then(|| (eta, inner_w));
            let w = self.insert(xi, yj, k - 1, support);
            self.nodes[z].subs.insert(w);
        }
    }

    /// Bottom-up assembly into a lattice; vertex ids are level-0 node ids.
    fn assemble(&self, ambient: usize) -> Result<FaceLattice<T>, GeomError> {
        let mut draft = LatticeDraft::new();
        let mut at: HashMap<usize, usize> = HashMap::new();
        let mut verts: HashMap<usize, BTreeSet<usize>> = HashMap::new();
        for (k, level) in self.levels.iter().enumerate() {
            for &i in level {
                let set: BTreeSet<usize> = if k == 0 {
                    BTreeSet::from([i])
                } else {
                    self.nodes[i]
                        .subs
                        .iter()
                        .filter_map(|s| verts.get(s))
                        .flat_map(|s| s.iter().copied())
                        .collect()
                };
                let j = draft.face(k, set.clone());
                for s in &self.nodes[i].subs {
                    if let Some(&sj) = at.get(s) {
                        draft.link(sj, j);
                    }
                }
                at.insert(i, j);
                verts.insert(i, set);
            }
        }
        let coords = |i: usize| -> DVector<T> {
            let node = &self.nodes[i];
            let a = self.p.face_points(node.x).next();
            let b = self.q.face_points(node.y).next();
            match (a, b) {
                (Some(a), Some(b)) => a + b,
                _ => DVector::zeros(ambient),
            }
        };
        let lattice = FaceLattice::from_draft(&draft, coords, ambient, self.cfg)?;
        lattice.validate()?;
        Ok(lattice)
    }
}
