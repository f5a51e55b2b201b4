//! Small utilities: lazy k-combinations and square linear solves.

use nalgebra::{DMatrix, DVector};

use super::basis::AffineBasis;
use crate::cfg::GeomCfg;
use crate::scalar::Real;

/// k-combinations of `0..n` in lexicographic order, produced lazily so a
/// "first feasible wins" search stops early.
pub(crate) struct Combinations {
    idxs: Vec<usize>,
    n: usize,
    done: bool,
}

impl Combinations {
    pub(crate) fn new(n: usize, k: usize) -> Self {
        Self {
            idxs: (0..k).collect(),
            n,
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let out = self.idxs.clone();
        let k = self.idxs.len();
        // advance the rightmost index that still has room
        let mut i = k;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.idxs[i] != i + self.n - k {
                self.idxs[i] += 1;
                for j in i + 1..k {
                    self.idxs[j] = self.idxs[j - 1] + 1;
                }
                break;
            }
        }
        Some(out)
    }
}

/// Solve `rows · x = rhs` for a square, well-conditioned system.
///
/// Rank is decided with the tolerance first; `None` when the rows are
/// (numerically) dependent.
pub(crate) fn solve_square<T: Real>(
    rows: &[&DVector<T>],
    rhs: &[T],
    cfg: &GeomCfg<T>,
) -> Option<DVector<T>> {
    let n = rows.first()?.len();
    if rows.len() != n || rhs.len() != n {
        return None;
    }
    if linear_rank(rows.iter().copied(), n, cfg) < n {
        return None;
    }
    let a = DMatrix::from_fn(n, n, |i, j| rows[i][j]);
    let b = DVector::from_column_slice(rhs);
    a.lu().solve(&b)
}

/// Dimension of the linear span of `vectors`.
pub(crate) fn linear_rank<'a, T, I>(vectors: I, ambient: usize, cfg: &GeomCfg<T>) -> usize
where
    T: Real,
    I: IntoIterator<Item = &'a DVector<T>>,
{
    let mut basis = AffineBasis::linear(ambient);
    for v in vectors {
        basis.push_dir(v, cfg);
    }
    basis.dim()
}
