//! Reproducible point swarms for tests and benches.
//!
//! Regular shapes (cube, simplex, cross-polytope) are exact; random draws take
//! an explicit `Rng`, usually `ReplayToken::rng()`, so every sample can be
//! regenerated from `(seed, index)`.

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::cfg::GeomCfg;
use crate::geom::AffineBasis;
use crate::lattice::FaceLattice;
use crate::scalar::Real;

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    pub fn new(seed: u64, index: u64) -> Self {
        Self { seed, index }
    }

    pub fn rng(self) -> StdRng {
        // SplitMix64 finalizer
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        StdRng::seed_from_u64(mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15))))
    }
}

/// The `2^dim` corners of `[0, 1]^dim`.
pub fn unit_cube<T: Real>(dim: usize) -> Vec<DVector<T>> {
    (0..1usize << dim)
        .map(|mask| DVector::from_fn(dim, |i, _| if (mask >> i) & 1 == 1 { T::lit(1.0) } else { T::lit(0.0) }))
        .collect()
}

/// Origin plus the unit vectors.
pub fn simplex<T: Real>(dim: usize) -> Vec<DVector<T>> {
    let mut out = vec![DVector::zeros(dim)];
    for i in 0..dim {
        let mut e = DVector::zeros(dim);
        e[i] = T::lit(1.0);
        out.push(e);
    }
    out
}

/// `±r·e_i`.
pub fn cross_polytope<T: Real>(dim: usize, r: f64) -> Vec<DVector<T>> {
    let mut out = Vec::with_capacity(2 * dim);
    for i in 0..dim {
        for s in [r, -r] {
            let mut e = DVector::zeros(dim);
            e[i] = T::lit(s);
            out.push(e);
        }
    }
    out
}

fn gaussian<R: Rng>(rng: &mut R) -> f64 {
    // Box–Muller
    let u: f64 = rng.gen_range(f64::EPSILON..1.0);
    let v: f64 = rng.gen();
    (-2.0 * u.ln()).sqrt() * (2.0 * std::f64::consts::PI * v).cos()
}

fn gaussian_vector<T: Real, R: Rng>(dim: usize, rng: &mut R) -> DVector<T> {
    DVector::from_fn(dim, |_, _| T::lit(gaussian(rng)))
}

/// `n` points uniformly on the sphere of radius `radius`.
pub fn on_sphere<T: Real, R: Rng>(dim: usize, n: usize, radius: f64, rng: &mut R) -> Vec<DVector<T>> {
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        let g: DVector<T> = gaussian_vector(dim, rng);
        let len = g.norm();
        if len.as_f64() > 1e-6 {
            out.push(g * (T::lit(radius) / len));
        }
    }
    out
}

/// `n` points uniformly in the ball of radius `radius`.
pub fn in_ball<T: Real, R: Rng>(dim: usize, n: usize, radius: f64, rng: &mut R) -> Vec<DVector<T>> {
    on_sphere::<T, R>(dim, n, 1.0, rng)
        .into_iter()
        .map(|p| {
            let s: f64 = rng.gen::<f64>().powf(1.0 / dim as f64) * radius;
            p * T::lit(s)
        })
        .collect()
}

/// `per_face` points in the relative interior of every k-face of `lattice`.
///
/// Each point is a convex combination of all the face's vertices with
/// strictly positive weights.
pub fn face_interior_points<T: Real, R: Rng>(
    lattice: &FaceLattice<T>,
    k: usize,
    per_face: usize,
    rng: &mut R,
) -> Vec<DVector<T>> {
    let mut out = Vec::new();
    for &id in lattice.level(k) {
        let verts: Vec<&DVector<T>> = lattice.face_points(id).collect();
        for _ in 0..per_face {
            let weights: Vec<f64> = verts.iter().map(|_| rng.gen_range(0.05..1.0)).collect();
            let total: f64 = weights.iter().sum();
            let mut p = DVector::zeros(lattice.ambient());
            for (v, w) in verts.iter().zip(&weights) {
                p += *v * T::lit(w / total);
            }
            out.push(p);
        }
    }
    out
}

/// Uniformly drawn rotation (orthogonal, determinant +1).
pub fn random_rotation<T: Real, R: Rng>(dim: usize, rng: &mut R) -> DMatrix<T> {
    let cfg = GeomCfg::<T>::default();
    let mut basis = AffineBasis::linear(dim);
    while basis.dim() < dim {
        let g = gaussian_vector(dim, rng);
        basis.push_dir(&g, &cfg);
    }
    let mut q = DMatrix::from_columns(basis.dirs());
    if q.determinant() < T::lit(0.0) {
        let flipped = -q.column(0);
        q.set_column(0, &flipped);
    }
    q
}

/// `rot · p + shift` for every point.
pub fn transform<T: Real>(points: &[DVector<T>], rot: &DMatrix<T>, shift: &DVector<T>) -> Vec<DVector<T>> {
    points.iter().map(|p| rot * p + shift).collect()
}

/// Copy of `points` in random order.
pub fn shuffled<T: Real, R: Rng>(points: &[DVector<T>], rng: &mut R) -> Vec<DVector<T>> {
    let mut out = points.to_vec();
    out.shuffle(rng);
    out
}
