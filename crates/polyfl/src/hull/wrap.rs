//! Gift wrapping in a frame of any dimension.
//!
//! A facet is found by rotating a supporting plane until it holds `k − 1`
//! independent points, then neighbours are reached by pivoting the plane
//! about each ridge. Facet hulls recurse one dimension lower in the facet's
//! own coordinates; the floor is the planar case.

use std::collections::{BTreeSet, HashMap, VecDeque};

use nalgebra::DVector;
use tracing::trace;

use super::planar;
use crate::cfg::GeomCfg;
use crate::error::GeomError;
use crate::geom::{centroid, lex_min_index, AffineBasis, Frame, Hyperplane};
use crate::lattice::LatticeDraft;
use crate::scalar::Real;

/// Hull of every point in `frame`, with vertex ids taken from `frame.ids`.
///
/// The frame's points must span its coordinate space.
pub(crate) fn hull_of<T: Real>(frame: &Frame<T>, cfg: &GeomCfg<T>) -> Result<LatticeDraft, GeomError> {
    let k = frame.dim();
    if frame.is_empty() {
        return Err(GeomError::DegenerateInput {
            dim: k,
            points: 0,
            rank: 0,
        });
    }
    match k {
        0 => {
            let mut draft = LatticeDraft::new();
            draft.vertex(frame.ids[0]);
            Ok(draft)
        }
        1 => planar::segment(frame, cfg),
        2 => planar::polygon(frame, cfg),
        _ if frame.len() == k + 1 => simplex(frame, cfg),
        _ => Wrapper::new(frame, cfg).run(),
    }
}

fn degenerate<T: Real>(frame: &Frame<T>, rank: usize) -> GeomError {
    GeomError::DegenerateInput {
        dim: frame.dim(),
        points: frame.len(),
        rank,
    }
}

/// Sub-frame of `members`, which must span a facet (`k − 1` dimensions).
fn facet_frame<T: Real>(frame: &Frame<T>, members: &[usize], cfg: &GeomCfg<T>) -> Result<Frame<T>, GeomError> {
    let sub = frame.restrict(members, cfg);
    if sub.dim() + 1 != frame.dim() {
        return Err(degenerate(frame, sub.dim()));
    }
    Ok(sub)
}

/// k + 1 affinely independent points: every k-subset is a facet.
fn simplex<T: Real>(frame: &Frame<T>, cfg: &GeomCfg<T>) -> Result<LatticeDraft, GeomError> {
    let k = frame.dim();
    let mut draft = LatticeDraft::new();
    let mut tops = Vec::with_capacity(frame.len());
    for skip in 0..frame.len() {
        let members: Vec<usize> = (0..frame.len()).filter(|&i| i != skip).collect();
        let sub = hull_of(&facet_frame(frame, &members, cfg)?, cfg)?;
        let top = sub.top().ok_or_else(|| degenerate(frame, k))?;
        let map = draft.absorb(&sub);
        tops.push(map[top]);
    }
    let top = draft.face(k, frame.ids.iter().copied().collect());
    for f in tops {
        draft.link(f, top);
    }
    Ok(draft)
}

struct Facet<T: Real> {
    plane: Hyperplane<T>,
    /// Frame indices of the facet's hull vertices.
    vertices: Vec<usize>,
    ridges: Vec<BTreeSet<usize>>,
    top: usize,
}

struct Wrapper<'a, T: Real> {
    frame: &'a Frame<T>,
    cfg: &'a GeomCfg<T>,
    draft: LatticeDraft,
    facets: Vec<Facet<T>>,
    /// In-plane swarm ids -> facet; two planes holding the same points are one facet.
    registry: HashMap<BTreeSet<usize>, usize>,
    ridge_table: HashMap<BTreeSet<usize>, Vec<usize>>,
    queue: VecDeque<usize>,
}

impl<'a, T: Real> Wrapper<'a, T> {
    fn new(frame: &'a Frame<T>, cfg: &'a GeomCfg<T>) -> Self {
        Self {
            frame,
            cfg,
            draft: LatticeDraft::new(),
            facets: Vec::new(),
            registry: HashMap::new(),
            ridge_table: HashMap::new(),
            queue: VecDeque::new(),
        }
    }

    fn k(&self) -> usize {
        self.frame.dim()
    }

    fn run(mut self) -> Result<LatticeDraft, GeomError> {
        let (plane, members) = self.first_plane()?;
        self.admit(plane, members)?;
        while let Some(f) = self.queue.pop_front() {
            let ridges = self.facets[f].ridges.clone();
            for ridge in ridges {
                if self.ridge_table.get(&ridge).map_or(0, |v| v.len()) >= 2 {
                    continue;
                }
                let (plane, members) = self.pivot(f, &ridge)?;
                let key: BTreeSet<usize> = members.iter().map(|&i| self.frame.ids[i]).collect();
                if !self.registry.contains_key(&key) {
                    self.admit(plane, members)?;
                }
            }
        }

        let k = self.k();
        let verts: BTreeSet<usize> = self
            .facets
            .iter()
            .flat_map(|f| f.vertices.iter().map(|&i| self.frame.ids[i]))
            .collect();
        let top = self.draft.face(k, verts);
        for f in &self.facets {
            self.draft.link(f.top, top);
        }
        Ok(self.draft)
    }

    /// Supporting plane through the lexicographically smallest point, rotated
    /// until it holds a full facet.
    fn first_plane(&self) -> Result<(Hyperplane<T>, Vec<usize>), GeomError> {
        let pts = &self.frame.coords;
        let k = self.k();
        let cfg = self.cfg;
        let p0 = lex_min_index(pts, cfg).ok_or_else(|| degenerate(self.frame, 0))?;
        let origin = pts[p0].clone();
        let mut normal = DVector::zeros(k);
        normal[0] = T::lit(-1.0);
        let mut basis = AffineBasis::new(origin.clone());

        loop {
            for p in pts {
                if cfg.is_zero(normal.dot(&(p - &origin))) {
                    basis.push_point(p, cfg);
                }
            }
            if basis.dim() + 1 >= k {
                break;
            }
            // pivot direction: largest component off the basis and the normal
            let mut best: Option<(T, DVector<T>)> = None;
            for p in pts {
                let mut c = basis.residual(&(p - &origin));
                let along = normal.dot(&c);
                c -= &normal * along;
                let len = c.norm();
                if len > cfg.eps && best.as_ref().map_or(true, |(b, _)| len > *b) {
                    best = Some((len, c));
                }
            }
            let Some((len, r)) = best else {
                return Err(degenerate(self.frame, basis.dim()));
            };
            let r = r / len;

            let mut angle: Option<T> = None;
            for p in pts {
                let v = p - &origin;
                let b = normal.dot(&v);
                if !cfg.is_neg(b) {
                    continue;
                }
                let a = r.dot(&v);
                let theta = (-b).atan2(a);
                if angle.map_or(true, |t| theta < t) {
                    angle = Some(theta);
                }
            }
            let Some(theta) = angle else {
                return Err(degenerate(self.frame, basis.dim()));
            };
            let turned = &normal * theta.cos() + &r * theta.sin();
            let len = turned.norm();
            normal = turned / len;
        }

        let plane = Hyperplane::through_point(normal, &origin).ok_or_else(|| degenerate(self.frame, 0))?;
        let members = self.on_plane(&plane);
        Ok((plane, members))
    }

    fn on_plane(&self, plane: &Hyperplane<T>) -> Vec<usize> {
        (0..self.frame.len())
            .filter(|&i| plane.contains(&self.frame.coords[i], self.cfg))
            .collect()
    }

    /// Build the facet's hull, register it and queue it.
    fn admit(&mut self, plane: Hyperplane<T>, members: Vec<usize>) -> Result<(), GeomError> {
        let k = self.k();
        let sub = facet_frame(self.frame, &members, self.cfg)?;
        let hull = hull_of(&sub, self.cfg)?;
        let sub_top = hull.top().ok_or_else(|| degenerate(self.frame, k - 1))?;
        let map = self.draft.absorb(&hull);
        let top = map[sub_top];

        let vertices: Vec<usize> = hull.faces[sub_top]
            .verts
            .iter()
            .filter_map(|&id| self.frame.position(id))
            .collect();
        let ridges: Vec<BTreeSet<usize>> = hull.level(k - 2).map(|i| hull.faces[i].verts.clone()).collect();

        let idx = self.facets.len();
        let key: BTreeSet<usize> = members.iter().map(|&i| self.frame.ids[i]).collect();
        trace!(dim = k, facet = idx, members = members.len(), vertices = vertices.len(), "facet");
        self.registry.insert(key, idx);
        for r in &ridges {
            self.ridge_table.entry(r.clone()).or_default().push(idx);
        }
        self.facets.push(Facet {
            plane,
            vertices,
            ridges,
            top,
        });
        self.queue.push_back(idx);
        Ok(())
    }

    /// Neighbour of facet `f` across `ridge` (swarm ids).
    fn pivot(&self, f: usize, ridge: &BTreeSet<usize>) -> Result<(Hyperplane<T>, Vec<usize>), GeomError> {
        let frame = self.frame;
        let cfg = self.cfg;
        let facet = &self.facets[f];
        let k = self.k();

        let ridge_pts: Vec<&DVector<T>> = ridge
            .iter()
            .filter_map(|&id| frame.position(id))
            .map(|i| &frame.coords[i])
            .collect();
        let r0 = (*ridge_pts.first().ok_or_else(|| degenerate(frame, k - 2))?).clone();
        let ridge_basis = AffineBasis::spanning(ridge_pts.iter().copied(), cfg)
            .ok_or_else(|| degenerate(frame, k - 2))?;
        let inside = centroid(facet.vertices.iter().map(|&i| &frame.coords[i]))
            .ok_or_else(|| degenerate(frame, k - 1))?;

        // in-facet direction pointing out across the ridge
        let n = &facet.plane.normal;
        let mut w = ridge_basis.residual(&(&r0 - &inside));
        let along = n.dot(&w);
        w -= n * along;
        let len = w.norm();
        if len <= cfg.eps {
            return Err(degenerate(frame, k - 1));
        }
        let w = w / len;

        let mut best: Option<(T, T, T, usize)> = None;
        let mut cosines: Vec<(T, usize)> = Vec::new();
        for (j, p) in frame.coords.iter().enumerate() {
            let d = p - &r0;
            let y = n.dot(&d);
            if !cfg.is_neg(y) {
                continue;
            }
            let x = w.dot(&d);
            let rho = (x * x + y * y).sqrt();
            let cos = x / rho;
            cosines.push((cos, j));
            if best.map_or(true, |(b, ..)| cos > b) {
                best = Some((cos, x, y, j));
            }
        }
        let Some((best_cos, x, y, _)) = best else {
            return Err(degenerate(frame, k - 1));
        };
        let rho = (x * x + y * y).sqrt();
        let normal = n * (x / rho) + &w * (-y / rho);
        let plane = Hyperplane::through_point(normal, &r0).ok_or_else(|| degenerate(frame, k - 1))?;

        if cfg.strict {
            let rivals = cosines
                .iter()
                .filter(|(c, j)| cfg.eq(*c, best_cos) && !plane.contains(&frame.coords[*j], cfg))
                .count();
            if rivals > 0 {
                return Err(GeomError::AmbiguousTie {
                    dim: k,
                    candidates: rivals + 1,
                });
            }
        }

        let members = self.on_plane(&plane);
        Ok((plane, members))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dvector;

    #[test]
    fn tetrahedron_takes_the_simplex_path() {
        let cfg = GeomCfg::<f64>::default();
        let frame = Frame::root(vec![
            dvector![0.0, 0.0, 0.0],
            dvector![1.0, 0.0, 0.0],
            dvector![0.0, 1.0, 0.0],
            dvector![0.0, 0.0, 1.0],
        ]);
        let d = hull_of(&frame, &cfg).unwrap();
        let counts: Vec<usize> = (0..=3).map(|k| d.level(k).count()).collect();
        assert_eq!(counts, vec![4, 6, 4, 1]);
    }

    #[test]
    fn first_plane_supports_every_point() {
        let cfg = GeomCfg::<f64>::default();
        let frame = Frame::root(vec![
            dvector![0.0, 0.0, 0.0],
            dvector![2.0, 0.0, 0.0],
            dvector![0.0, 2.0, 0.0],
            dvector![0.0, 0.0, 2.0],
            dvector![2.0, 2.0, 2.0],
            dvector![1.0, 1.0, 1.0],
        ]);
        let wrapper = Wrapper::new(&frame, &cfg);
        let (plane, members) = wrapper.first_plane().unwrap();
        assert!(members.len() >= 3);
        for p in &frame.coords {
            assert!(plane.satisfies(p, &cfg));
        }
    }

    #[test]
    fn pyramid_apex_is_wrapped() {
        let cfg = GeomCfg::<f64>::default();
        let frame = Frame::root(vec![
            dvector![0.0, 0.0, 0.0],
            dvector![1.0, 0.0, 0.0],
            dvector![1.0, 1.0, 0.0],
            dvector![0.0, 1.0, 0.0],
            dvector![0.5, 0.5, 1.0],
            dvector![0.5, 0.5, 0.2],
        ]);
        let d = hull_of(&frame, &cfg).unwrap();
        let counts: Vec<usize> = (0..=3).map(|k| d.level(k).count()).collect();
        assert_eq!(counts, vec![5, 8, 5, 1]);
        assert!(d.find(&BTreeSet::from([5])).is_none());
    }
}
