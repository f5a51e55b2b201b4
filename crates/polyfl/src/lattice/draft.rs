//! Face registry used while a lattice is being assembled.
//!
//! Faces are keyed by their vertex-id sets (a face of a polytope is determined
//! by its vertices), so inserting the same face twice from two recursive
//! builds (a ridge seen from both of its facets) yields one node.

use std::collections::{BTreeSet, HashMap};

#[derive(Clone, Debug)]
pub(crate) struct DraftFace {
    pub dim: usize,
    pub verts: BTreeSet<usize>,
    pub subs: BTreeSet<usize>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct LatticeDraft {
    pub faces: Vec<DraftFace>,
    index: HashMap<BTreeSet<usize>, usize>,
}

impl LatticeDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or insert the face with vertex ids `verts`.
    pub fn face(&mut self, dim: usize, verts: BTreeSet<usize>) -> usize {
        if let Some(&i) = self.index.get(&verts) {
            debug_assert_eq!(self.faces[i].dim, dim, "one vertex set, two dimensions");
            return i;
        }
        let i = self.faces.len();
        self.index.insert(verts.clone(), i);
        self.faces.push(DraftFace {
            dim,
            verts,
            subs: BTreeSet::new(),
        });
        i
    }

    #[inline]
    pub fn vertex(&mut self, id: usize) -> usize {
        self.face(0, BTreeSet::from([id]))
    }

    #[inline]
    pub fn find(&self, verts: &BTreeSet<usize>) -> Option<usize> {
        self.index.get(verts).copied()
    }

    #[inline]
    pub fn link(&mut self, sub: usize, sup: usize) {
        self.faces[sup].subs.insert(sub);
    }

    pub fn max_dim(&self) -> Option<usize> {
        self.faces.iter().map(|f| f.dim).max()
    }

    /// The unique face of highest dimension.
    pub fn top(&self) -> Option<usize> {
        let d = self.max_dim()?;
        let mut it = self.level(d);
        let top = it.next()?;
        if it.next().is_some() {
            return None;
        }
        Some(top)
    }

    pub fn level(&self, dim: usize) -> impl Iterator<Item = usize> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(move |(_, f)| f.dim == dim)
            .map(|(i, _)| i)
    }

    /// Merge `other` (same id space) into `self`; returns the index map.
    pub fn absorb(&mut self, other: &LatticeDraft) -> Vec<usize> {
        let mut order: Vec<usize> = (0..other.faces.len()).collect();
        order.sort_by_key(|&i| other.faces[i].dim);
        let mut map = vec![usize::MAX; other.faces.len()];
        for i in order {
            let f = &other.faces[i];
            let j = self.face(f.dim, f.verts.clone());
            map[i] = j;
            for &s in &f.subs {
                self.link(map[s], j);
            }
        }
        map
    }
}
