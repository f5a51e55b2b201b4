//! Points are plain `DVector<T>`; identity is decided with the configured
//! tolerance, never bitwise.

use std::cmp::Ordering;

use nalgebra::DVector;

use crate::cfg::GeomCfg;
use crate::scalar::Real;

/// All coordinates within `eps`.
#[inline]
pub fn points_eq<T: Real>(a: &DVector<T>, b: &DVector<T>, cfg: &GeomCfg<T>) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| cfg.eq(*x, *y))
}

/// Lexicographic order where coordinates within `eps` tie.
///
/// Not a total order (tolerance is not transitive); use it for searches, not
/// for `sort_by`.
pub fn lex_cmp<T: Real>(a: &DVector<T>, b: &DVector<T>, cfg: &GeomCfg<T>) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        if cfg.eq(*x, *y) {
            continue;
        }
        return x.partial_cmp(y).unwrap_or(Ordering::Equal);
    }
    a.len().cmp(&b.len())
}

/// Index of the lexicographically smallest point (first one on ties).
pub fn lex_min_index<T: Real>(points: &[DVector<T>], cfg: &GeomCfg<T>) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, p) in points.iter().enumerate() {
        match best {
            Some(b) if lex_cmp(p, &points[b], cfg) != Ordering::Less => {}
            _ => best = Some(i),
        }
    }
    best
}

/// First index whose point equals `p` within tolerance.
pub fn find_point<T: Real>(points: &[DVector<T>], p: &DVector<T>, cfg: &GeomCfg<T>) -> Option<usize> {
    points.iter().position(|q| points_eq(q, p, cfg))
}

/// Indices of the first occurrence of every distinct point, in input order.
pub fn dedup_points<T: Real>(points: &[DVector<T>], cfg: &GeomCfg<T>) -> Vec<usize> {
    let mut kept: Vec<usize> = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        if !kept.iter().any(|&k| points_eq(&points[k], p, cfg)) {
            kept.push(i);
        }
    }
    kept
}

/// Arithmetic mean; `None` for an empty iterator.
pub fn centroid<'a, T, I>(points: I) -> Option<DVector<T>>
where
    T: Real,
    I: IntoIterator<Item = &'a DVector<T>>,
{
    let mut it = points.into_iter();
    let first = it.next()?;
    let mut acc = first.clone();
    let mut count = 1usize;
    for p in it {
        acc += p;
        count += 1;
    }
    Some(acc / T::lit(count as f64))
}
