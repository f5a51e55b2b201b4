//! Half-space intersections as face lattices.
//!
//! Vertices are found by walking edges from a first vertex: at each vertex,
//! every (d−1)-subset of the tight half-spaces with full rank fixes a line,
//! and the feasible directions along it are marched until another
//! half-space blocks. Higher faces are then grown level by level: two k-faces
//! in a common half-space span the minimal face containing the midpoint of
//! their inner points, which is a (k+1)-face exactly when its vertices have
//! affine rank k+1.

use std::collections::{BTreeSet, HashSet, VecDeque};

use nalgebra::DVector;
use tracing::debug;

use crate::cfg::GeomCfg;
use crate::error::GeomError;
use crate::geom::util::{solve_square, Combinations};
use crate::geom::{centroid, find_point, points_eq, AffineBasis, Hyperplane};
use crate::lattice::{FaceLattice, LatticeDraft};
use crate::scalar::Real;

/// Face lattice of `{x : n_i·x <= c_i for all i}` in `dim` dimensions.
///
/// The intersection must be bounded and non-empty. Redundant and repeated
/// half-spaces are allowed.
pub fn from_halfspaces<T: Real>(
    hs: &[Hyperplane<T>],
    dim: usize,
    cfg: &GeomCfg<T>,
) -> Result<FaceLattice<T>, GeomError> {
    if dim == 0 {
        return Err(GeomError::UnsupportedDimension {
            op: "half-space intersection",
            dim,
        });
    }
    if let Some(bad) = hs.iter().find(|h| h.dim() != dim) {
        return Err(GeomError::DimensionMismatch {
            expected: dim,
            found: bad.dim(),
        });
    }
    let start = first_vertex(hs, dim, cfg).ok_or(GeomError::InfeasibleSystem {
        dim,
        halfspaces: hs.len(),
    })?;
    let (vertices, edges) = explore(hs, dim, start, cfg)?;
    let tight: Vec<BTreeSet<usize>> = vertices.iter().map(|v| tight_set(hs, v, cfg)).collect();
    let rank = AffineBasis::spanning(vertices.iter(), cfg).map_or(0, |b| b.dim());

    let mut draft = LatticeDraft::new();
    let vfaces: Vec<usize> = (0..vertices.len()).map(|i| draft.vertex(i)).collect();
    let mut level: Vec<usize> = Vec::with_capacity(edges.len());
    for &(a, b) in &edges {
        let e = draft.face(1, BTreeSet::from([a, b]));
        draft.link(vfaces[a], e);
        draft.link(vfaces[b], e);
        level.push(e);
    }
    let grower = Grower {
        hs,
        vertices: &vertices,
        tight: &tight,
        cfg,
    };
    for k in 1..rank.saturating_sub(1) {
        level = grower.grow(&mut draft, &level, k);
    }
    if rank >= 2 {
        let top = draft.face(rank, (0..vertices.len()).collect());
        for f in level {
            draft.link(f, top);
        }
    }

    let lattice = FaceLattice::from_draft(&draft, |i| vertices[i].clone(), dim, cfg)?;
    debug!(
        dim,
        halfspaces = hs.len(),
        vertices = lattice.vertices().len(),
        faces = lattice.faces().len(),
        "half-space lattice built"
    );
    Ok(lattice)
}

/// First vertex in lexicographic order of `dim`-subsets that satisfies every
/// half-space.
pub(crate) fn first_vertex<T: Real>(hs: &[Hyperplane<T>], dim: usize, cfg: &GeomCfg<T>) -> Option<DVector<T>> {
    Combinations::new(hs.len(), dim).find_map(|subset| {
        let rows: Vec<&DVector<T>> = subset.iter().map(|&i| &hs[i].normal).collect();
        let rhs: Vec<T> = subset.iter().map(|&i| hs[i].offset).collect();
        let x = solve_square(&rows, &rhs, cfg)?;
        hs.iter().all(|h| h.satisfies(&x, cfg)).then_some(x)
    })
}

fn tight_set<T: Real>(hs: &[Hyperplane<T>], p: &DVector<T>, cfg: &GeomCfg<T>) -> BTreeSet<usize> {
    hs.iter()
        .enumerate()
        .filter(|(_, h)| h.contains(p, cfg))
        .map(|(i, _)| i)
        .collect()
}

type Edges = BTreeSet<(usize, usize)>;

/// Breadth-first walk over the vertex-edge graph.
fn explore<T: Real>(
    hs: &[Hyperplane<T>],
    dim: usize,
    start: DVector<T>,
    cfg: &GeomCfg<T>,
) -> Result<(Vec<DVector<T>>, Edges), GeomError> {
    let mut vertices = vec![start];
    let mut edges = Edges::new();
    let mut queue = VecDeque::from([0usize]);
    while let Some(i) = queue.pop_front() {
        let v = vertices[i].clone();
        let active: Vec<usize> = tight_set(hs, &v, cfg).into_iter().collect();
        for dir in edge_directions(hs, &active, dim, cfg) {
            let Some(w) = march(hs, &active, &v, &dir, dim, cfg)? else {
                continue;
            };
            let j = match find_point(&vertices, &w, cfg) {
                Some(j) => j,
                None => {
                    vertices.push(w);
                    queue.push_back(vertices.len() - 1);
                    vertices.len() - 1
                }
            };
            if i != j {
                edges.insert((i.min(j), i.max(j)));
            }
        }
    }
    Ok((vertices, edges))
}

/// Unit directions along which every active half-space is non-increasing and
/// `dim − 1` of them stay tight.
fn edge_directions<T: Real>(
    hs: &[Hyperplane<T>],
    active: &[usize],
    dim: usize,
    cfg: &GeomCfg<T>,
) -> Vec<DVector<T>> {
    let mut dirs: Vec<DVector<T>> = Vec::new();
    for subset in Combinations::new(active.len(), dim - 1) {
        let mut span = AffineBasis::linear(dim);
        for &s in &subset {
            span.push_dir(&hs[active[s]].normal, cfg);
        }
        if span.dim() + 1 != dim {
            continue;
        }
        let comp = span.complement(cfg);
        let [u] = comp.as_slice() else {
            continue;
        };
        for d in [u.clone(), -u] {
            let feasible = active.iter().all(|&a| hs[a].normal.dot(&d) <= cfg.eps);
            if feasible && !dirs.iter().any(|e| points_eq(e, &d, cfg)) {
                dirs.push(d);
            }
        }
    }
    dirs
}

/// Next vertex from `v` along `d`; `None` for a zero-length step.
fn march<T: Real>(
    hs: &[Hyperplane<T>],
    active: &[usize],
    v: &DVector<T>,
    d: &DVector<T>,
    dim: usize,
    cfg: &GeomCfg<T>,
) -> Result<Option<DVector<T>>, GeomError> {
    let mut hits: Vec<T> = Vec::new();
    let mut best: Option<T> = None;
    for (j, h) in hs.iter().enumerate() {
        if active.contains(&j) {
            continue;
        }
        let rate = h.normal.dot(d);
        if rate <= cfg.eps {
            continue;
        }
        let t = -h.eval(v) / rate;
        hits.push(t);
        if best.map_or(true, |b| t < b) {
            best = Some(t);
        }
    }
    let Some(t) = best else {
        return Err(GeomError::UnboundedRegion {
            dim,
            halfspaces: hs.len(),
        });
    };
    if t <= cfg.eps {
        return Ok(None);
    }
    if cfg.strict {
        // exact ties meet at the new vertex; near ties within eps do not
        let exact = cfg.eps * T::lit(0.01);
        let rivals = hits
            .iter()
            .filter(|s| {
                let gap = (**s - t).abs();
                gap > exact && gap <= cfg.eps
            })
            .count();
        if rivals > 0 {
            return Err(GeomError::AmbiguousTie {
                dim,
                candidates: rivals + 1,
            });
        }
    }
    Ok(Some(v + d * t))
}

struct Grower<'a, T: Real> {
    hs: &'a [Hyperplane<T>],
    vertices: &'a [DVector<T>],
    tight: &'a [BTreeSet<usize>],
    cfg: &'a GeomCfg<T>,
}

impl<T: Real> Grower<'_, T> {
    /// (k+1)-faces from the k-faces in `level` (draft indices).
    fn grow(&self, draft: &mut LatticeDraft, level: &[usize], k: usize) -> Vec<usize> {
        let inner: Vec<DVector<T>> = level
            .iter()
            .map(|&f| {
                centroid(draft.faces[f].verts.iter().map(|&v| &self.vertices[v]))
                    .unwrap_or_else(|| DVector::zeros(0))
            })
            .collect();
        let mut tried: HashSet<(usize, usize)> = HashSet::new();
        let mut out = Vec::new();
        for h in 0..self.hs.len() {
            let on: Vec<usize> = (0..level.len())
                .filter(|&i| draft.faces[level[i]].verts.iter().all(|&v| self.tight[v].contains(&h)))
                .collect();
            for (x, &a) in on.iter().enumerate() {
                for &b in &on[x + 1..] {
                    if !tried.insert((a, b)) {
                        continue;
                    }
                    let mid = (&inner[a] + &inner[b]) * T::lit(0.5);
                    let g = self.minimal_face(&mid);
                    let fa = &draft.faces[level[a]].verts;
                    let fb = &draft.faces[level[b]].verts;
                    if !fa.is_subset(&g) || !fb.is_subset(&g) || draft.find(&g).is_some() {
                        continue;
                    }
                    let rank = AffineBasis::spanning(g.iter().map(|&v| &self.vertices[v]), self.cfg)
                        .map_or(0, |s| s.dim());
                    if rank != k + 1 {
                        continue;
                    }
                    let subs: Vec<usize> = level
                        .iter()
                        .copied()
                        .filter(|&f| draft.faces[f].verts.is_subset(&g))
                        .collect();
                    let id = draft.face(k + 1, g);
                    for f in subs {
                        draft.link(f, id);
                    }
                    out.push(id);
                }
            }
        }
        out
    }

    /// Vertices saturating every half-space tight at `p`.
    fn minimal_face(&self, p: &DVector<T>) -> BTreeSet<usize> {
        let s = tight_set(self.hs, p, self.cfg);
        (0..self.vertices.len())
            .filter(|&v| s.is_subset(&self.tight[v]))
            .collect()
    }
}
