//! Dense linear algebra: partial pivoting, LU decomposition and inversion.
//!
//! All routines are square-only and run sequentially. Singular input is not
//! detected; a zero pivot propagates `inf`/`NaN` through the result.

use crate::dense::Dense;
use crate::element::Element;
use crate::matrix::{Matrix, MatrixMut};
use crate::shape;

/// Result of choosing a pivot row for one column.
#[derive(Debug, Clone)]
pub struct Pivot<T: Element> {
    /// Permutation matrix that applies the row exchange (identity if none).
    pub permutation: Dense<T>,
    /// Whether a row exchange is needed.
    pub swapped: bool,
    /// The two rows exchanged, `[row, pivot_row]`.
    pub positions: [usize; 2],
}

/// Factors of `P·A = L·U`.
#[derive(Debug, Clone)]
pub struct Lu<T: Element> {
    /// Unit lower-triangular factor.
    pub l: Dense<T>,
    /// Upper-triangular factor.
    pub u: Dense<T>,
    /// Row permutation.
    pub p: Dense<T>,
}

impl<T: Element> Dense<T> {
    /// Choose the pivot for column `row`: the row at or below `row` with the
    /// largest absolute value in that column. Ties keep the first such row.
    ///
    /// # Panics
    /// Panics if `self` is not square or `row` is out of range.
    #[track_caller]
    pub fn pivoting(&self, row: usize) -> Pivot<T> {
        shape::assert_square("pivoting", self.shape());
        let n = self.rows();
        assert!(row < n, "pivoting: row {row} out of range for shape {}", self.shape());

        let best = pivot_row(self.data(), n, row);
        let mut permutation = Dense::identity(n);
        if best != row {
            permutation.swap_rows_in_place(row, best);
        }
        Pivot {
            permutation,
            swapped: best != row,
            positions: [row, best],
        }
    }

    /// LU decomposition with partial pivoting (Doolittle).
    ///
    /// Returns `L` (unit lower-triangular), `U` (upper-triangular) and a
    /// permutation `P` with `P·A = L·U`. The multipliers are stored directly
    /// in `L` as each column is eliminated.
    ///
    /// # Panics
    /// Panics if `self` is not square.
    #[track_caller]
    pub fn lu(&self) -> Lu<T> {
        shape::assert_square("lu", self.shape());
        let n = self.rows();
        let mut u = self.clone();
        let mut p = Dense::identity(n);
        let mut l = Dense::zeros(n, n);

        for i in 0..n {
            let best = pivot_row(u.data(), n, i);
            if best != i {
                u.swap_rows_in_place(i, best);
                p.swap_rows_in_place(i, best);
                l.swap_rows_in_place(i, best);
            }

            let pivot = u.at(i, i);
            for j in i + 1..n {
                let factor = u.at(j, i) / pivot;
                l.set(j, i, factor);
                let data = u.data_mut();
                for k in i + 1..n {
                    data[j * n + k] = data[j * n + k] - factor * data[i * n + k];
                }
                data[j * n + i] = T::zero();
            }
        }

        let diag = l.data_mut();
        for i in 0..n {
            diag[i * n + i] = T::one();
        }
        Lu { l, u, p }
    }

    /// Matrix inverse via LU: solves `L·y = P·e_b` by forward substitution
    /// and `U·x = y` by back substitution for every column `b`.
    ///
    /// # Panics
    /// Panics if `self` is not square.
    #[track_caller]
    pub fn inverse(&self) -> Dense<T> {
        shape::assert_square("inverse", self.shape());
        let n = self.rows();
        let Lu { l, u, p } = self.lu();
        let (l, u, p) = (l.data(), u.data(), p.data());

        let mut inv = Dense::zeros(n, n);
        let mut y = vec![T::zero(); n];
        let mut x = vec![T::zero(); n];
        let out = inv.data_mut();
        for b in 0..n {
            for i in 0..n {
                let mut acc = p[i * n + b];
                for k in 0..i {
                    acc = acc - l[i * n + k] * y[k];
                }
                y[i] = acc;
            }
            for i in (0..n).rev() {
                let mut acc = y[i];
                for k in i + 1..n {
                    acc = acc - u[i * n + k] * x[k];
                }
                x[i] = acc / u[i * n + i];
            }
            for (i, &v) in x.iter().enumerate() {
                out[i * n + b] = v;
            }
        }
        inv
    }
}

/// Row index at or below `row` maximising `|a[i][row]|`, first one on ties.
fn pivot_row<T: Element>(a: &[T], n: usize, row: usize) -> usize {
    let mut best = row;
    let mut best_abs = a[row * n + row].abs();
    for i in row + 1..n {
        let v = a[i * n + row].abs();
        if v > best_abs {
            best = i;
            best_abs = v;
        }
    }
    best
}
