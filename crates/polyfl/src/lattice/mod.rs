//! Face lattices (FLrep).
//!
//! A `FaceLattice` is the leveled DAG of all faces of a polytope, from its
//! vertices (level 0) to the polytope itself (the single face on the top
//! level). Faces live in an arena and refer to each other by `FaceId`; vertex
//! sets index a shared coordinate table.
//!
//! Conventions
//! - Levels are sorted by vertex set, so two builds of the same input produce
//!   identical ids.
//! - A lattice may be lower-dimensional than its ambient space (Minkowski sums
//!   of flat summands). Facet planes are then taken inside the affine hull and
//!   `facet_halfspaces` adds equality pairs for the missing directions.
//! - Equality between lattices is structural (`structurally_eq`): vertex
//!   coordinates match within tolerance and the face/sub-face incidences agree.

mod draft;
mod face;
mod record;

pub(crate) use draft::LatticeDraft;
pub use face::{Face, FaceId};
pub use record::{FaceRecord, HalfspaceRecord, LatticeRecord};

use std::collections::{BTreeSet, HashMap};

use nalgebra::DVector;

use crate::cfg::GeomCfg;
use crate::error::GeomError;
use crate::geom::{centroid, points_eq, AffineBasis, Hyperplane};
use crate::scalar::Real;

#[derive(Clone, Debug)]
pub struct FaceLattice<T: Real> {
    ambient: usize,
    vertices: Vec<DVector<T>>,
    faces: Vec<Face<T>>,
    levels: Vec<Vec<FaceId>>,
}

impl<T: Real> FaceLattice<T> {
    /// Freeze a draft whose vertex ids are resolved by `coords`.
    ///
    /// Vertex ids are compacted in increasing order; faces are ordered by
    /// `(dim, vertex set)`. Facet planes are computed from the vertices and
    /// oriented against the top face's inner point.
    pub(crate) fn from_draft<F>(
        draft: &LatticeDraft,
        coords: F,
        ambient: usize,
        cfg: &GeomCfg<T>,
    ) -> Result<Self, GeomError>
    where
        F: Fn(usize) -> DVector<T>,
    {
        let top_dim = draft
            .max_dim()
            .ok_or_else(|| GeomError::malformed("empty lattice"))?;
        draft
            .top()
            .ok_or_else(|| GeomError::malformed("no unique top face"))?;

        let mut ids: Vec<usize> = draft
            .level(0)
            .map(|i| {
                draft.faces[i]
                    .verts
                    .iter()
                    .next()
                    .copied()
                    .ok_or_else(|| GeomError::malformed("vertex face without a vertex"))
            })
            .collect::<Result<_, _>>()?;
        ids.sort_unstable();
        let compact: HashMap<usize, usize> = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        let vertices: Vec<DVector<T>> = ids.iter().map(|&id| coords(id)).collect();
        if let Some(bad) = vertices.iter().find(|v| v.len() != ambient) {
            return Err(GeomError::DimensionMismatch {
                expected: ambient,
                found: bad.len(),
            });
        }

        let remap = |verts: &BTreeSet<usize>| -> Result<BTreeSet<usize>, GeomError> {
            verts
                .iter()
                .map(|id| {
                    compact
                        .get(id)
                        .copied()
                        .ok_or_else(|| GeomError::malformed(format!("face uses unknown vertex {id}")))
                })
                .collect()
        };

        let mut order: Vec<(usize, BTreeSet<usize>, usize)> = Vec::with_capacity(draft.faces.len());
        for (i, f) in draft.faces.iter().enumerate() {
            order.push((f.dim, remap(&f.verts)?, i));
        }
        order.sort();

        let mut to_id = vec![FaceId(usize::MAX); draft.faces.len()];
        let mut levels: Vec<Vec<FaceId>> = vec![Vec::new(); top_dim + 1];
        let mut faces: Vec<Face<T>> = Vec::with_capacity(order.len());
        for (dim, verts, i) in order {
            let id = FaceId(faces.len());
            to_id[i] = id;
            levels[dim].push(id);
            let inner = centroid(verts.iter().map(|&v| &vertices[v]))
                .ok_or_else(|| GeomError::malformed("face without vertices"))?;
            faces.push(Face {
                dim,
                vertices: verts,
                subs: BTreeSet::new(),
                supers: BTreeSet::new(),
                plane: None,
                inner,
            });
        }
        for (i, f) in draft.faces.iter().enumerate() {
            let sup = to_id[i];
            for &s in &f.subs {
                let sub = to_id[s];
                faces[sup.0].subs.insert(sub);
                faces[sub.0].supers.insert(sup);
            }
        }

        let mut lattice = Self {
            ambient,
            vertices,
            faces,
            levels,
        };
        lattice.attach_facet_planes(cfg);
        Ok(lattice)
    }

    fn attach_facet_planes(&mut self, cfg: &GeomCfg<T>) {
        let d = self.dim();
        if d == 0 {
            return;
        }
        let top = self.top();
        let interior = self.faces[top.0].inner.clone();
        let Some(hull) = AffineBasis::spanning(self.vertices.iter(), cfg) else {
            return;
        };
        for &fid in &self.levels[d - 1] {
            let face = &self.faces[fid.0];
            let Some(flat) = AffineBasis::spanning(face.vertices.iter().map(|&v| &self.vertices[v]), cfg)
            else {
                continue;
            };
            let Some(normal) = flat.normal_within(&hull, cfg) else {
                continue;
            };
            if let Some(mut plane) = Hyperplane::through_point(normal, flat.origin()) {
                plane.orient_against(&interior);
                self.faces[fid.0].plane = Some(plane);
            }
        }
    }

    #[inline]
    pub fn ambient(&self) -> usize {
        self.ambient
    }

    /// Dimension of the polytope (the top level).
    #[inline]
    pub fn dim(&self) -> usize {
        self.levels.len() - 1
    }

    #[inline]
    pub fn vertices(&self) -> &[DVector<T>] {
        &self.vertices
    }

    #[inline]
    pub fn vertex(&self, i: usize) -> &DVector<T> {
        &self.vertices[i]
    }

    #[inline]
    pub fn faces(&self) -> &[Face<T>] {
        &self.faces
    }

    #[inline]
    pub fn face(&self, id: FaceId) -> &Face<T> {
        &self.faces[id.0]
    }

    /// Faces of dimension `k` (empty above the top).
    #[inline]
    pub fn level(&self, k: usize) -> &[FaceId] {
        self.levels.get(k).map_or(&[][..], |l| l.as_slice())
    }

    #[inline]
    pub fn top(&self) -> FaceId {
        self.levels[self.dim()][0]
    }

    /// Faces of dimension `dim − 1`.
    #[inline]
    pub fn facets(&self) -> &[FaceId] {
        match self.dim() {
            0 => &[],
            d => self.level(d - 1),
        }
    }

    /// Number of faces per level (the f-vector, top included).
    pub fn face_counts(&self) -> Vec<usize> {
        self.levels.iter().map(|l| l.len()).collect()
    }

    /// Vertex coordinates of a face.
    pub fn face_points(&self, id: FaceId) -> impl Iterator<Item = &DVector<T>> + '_ {
        self.faces[id.0].vertices.iter().map(move |&v| &self.vertices[v])
    }

    /// Affine hull of the polytope.
    pub fn affine_hull(&self, cfg: &GeomCfg<T>) -> AffineBasis<T> {
        AffineBasis::spanning(self.vertices.iter(), cfg)
            .unwrap_or_else(|| AffineBasis::linear(self.ambient))
    }

    /// Facets sharing a ridge with `facet`.
    pub fn adjacent_facets(&self, facet: FaceId) -> BTreeSet<FaceId> {
        let mut out = BTreeSet::new();
        for ridge in &self.faces[facet.0].subs {
            for &other in &self.faces[ridge.0].supers {
                if other != facet {
                    out.insert(other);
                }
            }
        }
        out
    }

    /// All faces contained in `id`, itself included, by decreasing dimension.
    pub fn descendants(&self, id: FaceId) -> Vec<FaceId> {
        let mut seen: BTreeSet<FaceId> = BTreeSet::from([id]);
        let mut stack = vec![id];
        while let Some(f) = stack.pop() {
            for &s in &self.faces[f.0].subs {
                if seen.insert(s) {
                    stack.push(s);
                }
            }
        }
        let mut out: Vec<FaceId> = seen.into_iter().collect();
        out.sort_by(|a, b| self.faces[b.0].dim.cmp(&self.faces[a.0].dim).then(a.cmp(b)));
        out
    }

    /// Half-space description `n·x <= c`.
    ///
    /// One half-space per facet; when the polytope is flat in its ambient
    /// space, each missing direction `u` adds the pair `±u·x <= ±u·origin`.
    pub fn facet_halfspaces(&self, cfg: &GeomCfg<T>) -> Vec<Hyperplane<T>> {
        let mut out: Vec<Hyperplane<T>> = self
            .facets()
            .iter()
            .filter_map(|f| self.faces[f.0].plane.clone())
            .collect();
        let hull = self.affine_hull(cfg);
        for u in hull.complement(cfg) {
            if let Some(h) = Hyperplane::through_point(u, hull.origin()) {
                out.push(h.flipped());
                out.push(h);
            }
        }
        out
    }

    /// Closed membership test within tolerance.
    pub fn contains_point(&self, p: &DVector<T>, cfg: &GeomCfg<T>) -> bool {
        if self.dim() == 0 {
            return points_eq(&self.vertices[0], p, cfg);
        }
        self.facet_halfspaces(cfg).iter().all(|h| h.satisfies(p, cfg))
    }

    /// Same lattice up to vertex order and face ids.
    pub fn structurally_eq(&self, other: &Self, cfg: &GeomCfg<T>) -> bool {
        if self.ambient != other.ambient || self.face_counts() != other.face_counts() {
            return false;
        }
        // vertex bijection
        let mut vmap = vec![usize::MAX; self.vertices.len()];
        let mut used = vec![false; other.vertices.len()];
        for (i, v) in self.vertices.iter().enumerate() {
            let hit = other
                .vertices
                .iter()
                .enumerate()
                .find(|(j, w)| !used[*j] && points_eq(v, w, cfg));
            match hit {
                Some((j, _)) => {
                    used[j] = true;
                    vmap[i] = j;
                }
                None => return false,
            }
        }
        let index: HashMap<&BTreeSet<usize>, FaceId> = other
            .faces
            .iter()
            .enumerate()
            .map(|(i, f)| (&f.vertices, FaceId(i)))
            .collect();
        let mut fmap = vec![FaceId(usize::MAX); self.faces.len()];
        for (i, f) in self.faces.iter().enumerate() {
            let mapped: BTreeSet<usize> = f.vertices.iter().map(|&v| vmap[v]).collect();
            match index.get(&mapped) {
                Some(&g) if other.faces[g.0].dim == f.dim => fmap[i] = g,
                _ => return false,
            }
        }
        self.faces.iter().enumerate().all(|(i, f)| {
            let subs: BTreeSet<FaceId> = f.subs.iter().map(|s| fmap[s.0]).collect();
            subs == other.faces[fmap[i].0].subs
        })
    }

    /// Check the face invariants and sub/super symmetry.
    pub fn validate(&self) -> Result<(), GeomError> {
        if self.levels.last().map_or(true, |l| l.len() != 1) {
            return Err(GeomError::malformed("top level must hold exactly one face"));
        }
        for (k, level) in self.levels.iter().enumerate() {
            for &id in level {
                let f = &self.faces[id.0];
                if f.dim != k {
                    return Err(GeomError::malformed(format!("face {} filed under level {k}", id.0)));
                }
                if f.vertices.len() < k + 1 {
                    return Err(GeomError::malformed(format!(
                        "{k}-face {} has only {} vertices",
                        id.0,
                        f.vertices.len()
                    )));
                }
                if k == 0 {
                    if f.vertices.len() != 1 || !f.subs.is_empty() {
                        return Err(GeomError::malformed(format!("vertex face {} is not a point", id.0)));
                    }
                    continue;
                }
                let mut union = BTreeSet::new();
                for s in &f.subs {
                    let sub = &self.faces[s.0];
                    if sub.dim + 1 != k || !sub.supers.contains(&id) {
                        return Err(GeomError::malformed(format!("bad sub link {} -> {}", id.0, s.0)));
                    }
                    union.extend(sub.vertices.iter().copied());
                }
                if union != f.vertices {
                    return Err(GeomError::malformed(format!(
                        "face {} vertices differ from its sub-faces' union",
                        id.0
                    )));
                }
                for s in &f.supers {
                    if !self.faces[s.0].subs.contains(&id) {
                        return Err(GeomError::malformed(format!("bad super link {} -> {}", id.0, s.0)));
                    }
                }
            }
        }
        Ok(())
    }

    /// Draft with vertex ids equal to this lattice's vertex indices.
    pub(crate) fn to_draft(&self) -> LatticeDraft {
        let mut draft = LatticeDraft::new();
        let mut map = vec![usize::MAX; self.faces.len()];
        for level in &self.levels {
            for &id in level {
                let f = &self.faces[id.0];
                let j = draft.face(f.dim, f.vertices.clone());
                map[id.0] = j;
                for s in &f.subs {
                    draft.link(map[s.0], j);
                }
            }
        }
        draft
    }

    /// Copy moved by `t`.
    pub fn translated(&self, t: &DVector<T>, cfg: &GeomCfg<T>) -> Result<Self, GeomError> {
        let draft = self.to_draft();
        Self::from_draft(&draft, |i| &self.vertices[i] + t, self.ambient, cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dvector;

    fn unit_square() -> FaceLattice<f64> {
        let cfg = GeomCfg::default();
        let pts = [
            dvector![0.0, 0.0],
            dvector![1.0, 0.0],
            dvector![1.0, 1.0],
            dvector![0.0, 1.0],
        ];
        let mut d = LatticeDraft::new();
        let vs: Vec<usize> = (0..4).map(|i| d.vertex(i)).collect();
        let top = d.face(2, (0..4).collect());
        for i in 0..4 {
            let j = (i + 1) % 4;
            let e = d.face(1, BTreeSet::from([i, j]));
            d.link(vs[i], e);
            d.link(vs[j], e);
            d.link(e, top);
        }
        FaceLattice::from_draft(&d, |i| pts[i].clone(), 2, &cfg).unwrap()
    }

    #[test]
    fn square_levels_and_planes() {
        let sq = unit_square();
        sq.validate().unwrap();
        assert_eq!(sq.face_counts(), vec![4, 4, 1]);
        let cfg = GeomCfg::default();
        for &f in sq.facets() {
            let plane = sq.face(f).plane.as_ref().unwrap();
            // outward: the center is strictly inside
            assert!(plane.contains_negative(&dvector![0.5, 0.5], &cfg));
            for p in sq.face_points(f) {
                assert!(plane.contains(p, &cfg));
            }
        }
        assert!(sq.contains_point(&dvector![0.25, 0.75], &cfg));
        assert!(!sq.contains_point(&dvector![1.5, 0.5], &cfg));
    }

    #[test]
    fn adjacency_and_descendants() {
        let sq = unit_square();
        for &f in sq.facets() {
            assert_eq!(sq.adjacent_facets(f).len(), 2);
        }
        let desc = sq.descendants(sq.top());
        assert_eq!(desc.len(), 9);
        assert_eq!(desc[0], sq.top());
        assert_eq!(sq.face(*desc.last().unwrap()).dim, 0);
    }

    #[test]
    fn translation_preserves_structure_not_position() {
        let cfg = GeomCfg::default();
        let sq = unit_square();
        let moved = sq.translated(&dvector![2.0, -1.0], &cfg).unwrap();
        assert!(!sq.structurally_eq(&moved, &cfg));
        let back = moved.translated(&dvector![-2.0, 1.0], &cfg).unwrap();
        assert!(sq.structurally_eq(&back, &cfg));
    }

    #[test]
    fn flat_lattice_gets_equality_pairs() {
        let cfg = GeomCfg::<f64>::default();
        let mut d = LatticeDraft::new();
        let a = d.vertex(0);
        let b = d.vertex(1);
        let e = d.face(1, BTreeSet::from([0, 1]));
        d.link(a, e);
        d.link(b, e);
        let pts = [dvector![0.0, 0.0, 1.0], dvector![2.0, 0.0, 1.0]];
        let seg = FaceLattice::from_draft(&d, |i| pts[i].clone(), 3, &cfg).unwrap();
        let hs = seg.facet_halfspaces(&cfg);
        // two end caps + two pinned directions, each as a pair
        assert_eq!(hs.len(), 6);
        assert!(seg.contains_point(&dvector![1.0, 0.0, 1.0], &cfg));
        assert!(!seg.contains_point(&dvector![1.0, 0.1, 1.0], &cfg));
    }
}
