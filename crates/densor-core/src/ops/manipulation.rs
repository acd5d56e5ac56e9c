//! Structural operations: reshape, flatten, transpose, slice, row/column
//! extraction, padding, stacking and splitting.
//!
//! Everything here that returns a `Dense` copies into a fresh pooled buffer.
//! The `_in_place` variants only change the declared shape or permute the
//! existing buffer.

use std::ops::Range;

use crate::dense::Dense;
use crate::element::Element;
use crate::matrix::Matrix;
use crate::shape::{self, Shape};

impl<T: Element> Dense<T> {
    /// Copy with a new shape of equal size.
    ///
    /// # Panics
    /// Panics if `rows * cols != self.size()`.
    #[track_caller]
    pub fn reshape(&self, rows: usize, cols: usize) -> Dense<T> {
        shape::assert_same_size("reshape", self.shape(), Shape::new(rows, cols));
        Dense::new(rows, cols, self.data())
    }

    /// Change the declared shape without touching the buffer.
    ///
    /// # Panics
    /// Panics if `rows * cols != self.size()`.
    #[track_caller]
    pub fn reshape_in_place(&mut self, rows: usize, cols: usize) {
        shape::assert_same_size("reshape_in_place", self.shape(), Shape::new(rows, cols));
        self.set_shape(rows, cols);
    }

    /// Copy as a `1 × size` row vector.
    pub fn flatten(&self) -> Dense<T> {
        Dense::new(1, self.size(), self.data())
    }

    pub fn flatten_in_place(&mut self) {
        let n = self.size();
        self.set_shape(1, n);
    }

    /// Transposed copy.
    pub fn transpose(&self) -> Dense<T> {
        let (rows, cols) = (self.rows(), self.cols());
        let mut out = Dense::empty(cols, rows);
        let src = self.data();
        let dst = out.data_mut();
        for r in 0..rows {
            for c in 0..cols {
                dst[c * rows + r] = src[r * cols + c];
            }
        }
        out
    }

    /// Transpose without allocating a second buffer.
    ///
    /// Vectors, scalars and empty tensors only swap their dimensions. Square
    /// matrices swap across the diagonal. Rectangular matrices are permuted
    /// by following the cycles of the index map `i -> i * rows mod (size - 1)`,
    /// using O(1) extra memory and moving every element exactly once.
    pub fn transpose_in_place(&mut self) {
        let (rows, cols) = (self.rows(), self.cols());
        if rows > 1 && cols > 1 {
            if rows == cols {
                transpose_square(self.data_mut(), rows);
            } else {
                transpose_cycles(self.data_mut(), rows);
            }
        }
        self.set_shape(cols, rows);
    }

    /// Copy of the sub-matrix at `rows × cols`.
    ///
    /// # Panics
    /// Panics if either range is reversed or extends past the tensor.
    #[track_caller]
    pub fn slice(&self, rows: Range<usize>, cols: Range<usize>) -> Dense<T> {
        assert!(
            rows.start <= rows.end
                && rows.end <= self.rows()
                && cols.start <= cols.end
                && cols.end <= self.cols(),
            "slice: [{:?}, {:?}] out of range for shape {}",
            rows,
            cols,
            self.shape()
        );
        let width = cols.len();
        let mut out = Dense::empty(rows.len(), width);
        if width > 0 {
            let stride = self.cols();
            for (dst, r) in out.data_mut().chunks_mut(width).zip(rows) {
                dst.copy_from_slice(&self.data()[r * stride + cols.start..r * stride + cols.end]);
            }
        }
        out
    }

    /// Copy of row `row` as a `1 × cols` row vector.
    ///
    /// # Panics
    /// Panics if `row >= self.rows()`.
    #[track_caller]
    pub fn extract_row(&self, row: usize) -> Dense<T> {
        assert!(
            row < self.rows(),
            "extract_row: row {row} out of range for shape {}",
            self.shape()
        );
        let cols = self.cols();
        Dense::new(1, cols, &self.data()[row * cols..(row + 1) * cols])
    }

    /// Copy of column `col` as a `rows × 1` column vector.
    ///
    /// # Panics
    /// Panics if `col >= self.cols()`.
    #[track_caller]
    pub fn extract_column(&self, col: usize) -> Dense<T> {
        assert!(
            col < self.cols(),
            "extract_column: column {col} out of range for shape {}",
            self.shape()
        );
        let cols = self.cols();
        let mut out = Dense::empty(self.rows(), 1);
        for (o, row) in out.data_mut().iter_mut().zip(self.data().chunks(cols)) {
            *o = row[col];
        }
        out
    }

    /// Copy with `n` rows of zeros appended at the bottom.
    pub fn pad_rows(&self, n: usize) -> Dense<T> {
        let mut out = Dense::zeros(self.rows() + n, self.cols());
        out.data_mut()[..self.size()].copy_from_slice(self.data());
        out
    }

    /// Copy with `n` columns of zeros appended on the right.
    pub fn pad_columns(&self, n: usize) -> Dense<T> {
        let (rows, cols) = (self.rows(), self.cols());
        let mut out = Dense::zeros(rows, cols + n);
        if cols > 0 {
            for (dst, src) in out.data_mut().chunks_mut(cols + n).zip(self.data().chunks(cols)) {
                dst[..cols].copy_from_slice(src);
            }
        }
        out
    }

    /// `self` on top of `other`.
    ///
    /// # Panics
    /// Panics if the column counts differ.
    #[track_caller]
    pub fn vstack(&self, other: &impl Matrix<T>) -> Dense<T> {
        assert!(
            self.cols() == other.cols(),
            "vstack: column mismatch: {} vs {}",
            self.shape(),
            other.shape()
        );
        let mut out = Dense::empty(self.rows() + other.rows(), self.cols());
        let (top, bottom) = out.data_mut().split_at_mut(self.size());
        top.copy_from_slice(self.data());
        bottom.copy_from_slice(other.data());
        out
    }

    /// `self` to the left of `other`.
    ///
    /// # Panics
    /// Panics if the row counts differ.
    #[track_caller]
    pub fn hstack(&self, other: &impl Matrix<T>) -> Dense<T> {
        assert!(
            self.rows() == other.rows(),
            "hstack: row mismatch: {} vs {}",
            self.shape(),
            other.shape()
        );
        let (left, right) = (self.cols(), other.cols());
        let mut out = Dense::empty(self.rows(), left + right);
        if left + right > 0 {
            let rows = out.data_mut().chunks_mut(left + right);
            for (r, dst) in rows.enumerate() {
                dst[..left].copy_from_slice(&self.data()[r * left..(r + 1) * left]);
                dst[left..].copy_from_slice(&other.data()[r * right..(r + 1) * right]);
            }
        }
        out
    }

    /// Stack vectors of equal length as the rows of a new matrix.
    /// An empty list gives a 0×0 tensor.
    ///
    /// # Panics
    /// Panics if an item is not a vector or the lengths differ.
    #[track_caller]
    pub fn stack<M: Matrix<T>>(items: &[M]) -> Dense<T> {
        let Some(first) = items.first() else {
            return Dense::empty(0, 0);
        };
        let width = first.size();
        for item in items {
            shape::assert_vector("stack", item.shape());
            assert!(
                item.size() == width,
                "stack: length mismatch: {} vs {}",
                first.shape(),
                item.shape()
            );
        }
        let mut out = Dense::empty(items.len(), width);
        if width > 0 {
            for (dst, item) in out.data_mut().chunks_mut(width).zip(items) {
                dst.copy_from_slice(item.data());
            }
        }
        out
    }

    /// Concatenate vectors end to end into one column vector.
    ///
    /// # Panics
    /// Panics if an item is not a vector.
    #[track_caller]
    pub fn concat<M: Matrix<T>>(items: &[M]) -> Dense<T> {
        let mut total = 0;
        for item in items {
            shape::assert_vector("concat", item.shape());
            total += item.size();
        }
        let mut out = Dense::empty(total, 1);
        let mut offset = 0;
        let dst = out.data_mut();
        for item in items {
            dst[offset..offset + item.size()].copy_from_slice(item.data());
            offset += item.size();
        }
        out
    }

    /// Split a vector into consecutive column vectors of the given lengths.
    ///
    /// # Panics
    /// Panics if `self` is not a vector or the lengths do not add up to
    /// `self.size()`.
    #[track_caller]
    pub fn split_vector(&self, sizes: &[usize]) -> Vec<Dense<T>> {
        shape::assert_vector("split_vector", self.shape());
        let total: usize = sizes.iter().sum();
        assert!(
            total == self.size(),
            "split_vector: sizes add up to {total}, vector has {} elements",
            self.size()
        );
        let mut offset = 0;
        sizes
            .iter()
            .map(|&n| {
                let part = Dense::vector(&self.data()[offset..offset + n]);
                offset += n;
                part
            })
            .collect()
    }

    /// Swap rows `i` and `j` in place.
    ///
    /// # Panics
    /// Panics if either index is out of range.
    #[track_caller]
    pub fn swap_rows_in_place(&mut self, i: usize, j: usize) {
        let rows = self.rows();
        assert!(
            i < rows && j < rows,
            "swap_rows_in_place: rows ({i}, {j}) out of range for shape {}",
            self.shape()
        );
        if i == j {
            return;
        }
        let cols = self.cols();
        let (lo, hi) = (i.min(j), i.max(j));
        let (head, tail) = self.data_mut().split_at_mut(hi * cols);
        head[lo * cols..(lo + 1) * cols].swap_with_slice(&mut tail[..cols]);
    }
}

fn transpose_square<T>(data: &mut [T], n: usize) {
    for r in 0..n {
        for c in r + 1..n {
            data.swap(r * n + c, c * n + r);
        }
    }
}

/// In-place transpose of a `rows × (len / rows)` matrix with `rows, cols > 1`.
///
/// The element at flat index `i` moves to `i * rows mod (len - 1)`; the first
/// and last elements are fixed points. Each cycle is rotated once, starting
/// from its smallest index.
fn transpose_cycles<T>(data: &mut [T], rows: usize) {
    let n = data.len();
    let modulus = (n - 1) as u128;
    let dest = |i: usize| ((i as u128 * rows as u128) % modulus) as usize;

    for start in 1..n - 1 {
        let mut i = dest(start);
        while i > start {
            i = dest(i);
        }
        if i != start {
            continue;
        }
        let mut cur = start;
        loop {
            let next = dest(cur);
            if next == start {
                break;
            }
            data.swap(start, next);
            cur = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::MatrixMut;

    fn sample(rows: usize, cols: usize) -> Dense<f32> {
        Dense::from_fn(rows, cols, |r, c| (r * cols + c) as f32)
    }

    #[test]
    fn test_reshape_copies() {
        let t = sample(2, 3);
        let mut r = t.reshape(3, 2);
        assert_eq!(r.shape(), Shape::new(3, 2));
        assert_eq!(r.data(), t.data());
        r.set(0, 0, 99.0);
        assert_eq!(t.at(0, 0), 0.0);
    }

    #[test]
    #[should_panic(expected = "reshape: cannot reshape [2, 3] (6 elements) into [4, 2]")]
    fn test_reshape_size_mismatch() {
        let _ = sample(2, 3).reshape(4, 2);
    }

    #[test]
    fn test_reshape_in_place() {
        let mut t = sample(2, 3);
        let ptr = t.data().as_ptr();
        t.reshape_in_place(6, 1);
        assert_eq!(t.shape(), Shape::new(6, 1));
        assert_eq!(t.data().as_ptr(), ptr);
    }

    #[test]
    fn test_flatten() {
        let mut t = sample(3, 2);
        assert_eq!(t.flatten().shape(), Shape::new(1, 6));
        t.flatten_in_place();
        assert_eq!(t.shape(), Shape::new(1, 6));
        assert_eq!(t.data(), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_transpose() {
        let t = sample(2, 3);
        let tt = t.transpose();
        assert_eq!(tt.shape(), Shape::new(3, 2));
        assert_eq!(tt.data(), &[0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);
        assert_eq!(tt.transpose(), t);
    }

    #[test]
    fn test_transpose_in_place_rectangular() {
        for (rows, cols) in [(2, 3), (3, 2), (4, 7), (5, 3), (2, 8), (6, 10)] {
            let mut t = sample(rows, cols);
            let expected = t.transpose();
            t.transpose_in_place();
            assert_eq!(t, expected, "{rows}x{cols}");
            t.transpose_in_place();
            assert_eq!(t, sample(rows, cols), "{rows}x{cols} round trip");
        }
    }

    #[test]
    fn test_transpose_in_place_square() {
        let mut t = sample(3, 3);
        t.transpose_in_place();
        assert_eq!(t.data(), &[0.0, 3.0, 6.0, 1.0, 4.0, 7.0, 2.0, 5.0, 8.0]);
    }

    #[test]
    fn test_transpose_in_place_vectors_and_empty() {
        let mut v = sample(1, 4);
        v.transpose_in_place();
        assert_eq!(v.shape(), Shape::new(4, 1));
        assert_eq!(v.data(), &[0.0, 1.0, 2.0, 3.0]);

        let mut e = Dense::<f32>::zeros(0, 3);
        e.transpose_in_place();
        assert_eq!(e.shape(), Shape::new(3, 0));
    }

    #[test]
    fn test_slice() {
        let t = sample(3, 4);
        let s = t.slice(1..3, 1..3);
        assert_eq!(s.shape(), Shape::new(2, 2));
        assert_eq!(s.data(), &[5.0, 6.0, 9.0, 10.0]);
        assert_eq!(t.slice(0..3, 2..2).shape(), Shape::new(3, 0));
    }

    #[test]
    #[should_panic(expected = "slice:")]
    fn test_slice_out_of_range() {
        let _ = sample(2, 2).slice(0..3, 0..1);
    }

    #[test]
    fn test_extract_row_column() {
        let t = sample(3, 2);
        let r = t.extract_row(1);
        assert_eq!(r.shape(), Shape::new(1, 2));
        assert_eq!(r.data(), &[2.0, 3.0]);
        let c = t.extract_column(1);
        assert_eq!(c.shape(), Shape::new(3, 1));
        assert_eq!(c.data(), &[1.0, 3.0, 5.0]);
    }

    #[test]
    #[should_panic(expected = "extract_column: column 2 out of range")]
    fn test_extract_column_out_of_range() {
        let _ = sample(3, 2).extract_column(2);
    }

    #[test]
    fn test_pad() {
        let t = sample(2, 2);
        let r = t.pad_rows(1);
        assert_eq!(r.data(), &[0.0, 1.0, 2.0, 3.0, 0.0, 0.0]);
        let c = t.pad_columns(2);
        assert_eq!(c.shape(), Shape::new(2, 4));
        assert_eq!(c.data(), &[0.0, 1.0, 0.0, 0.0, 2.0, 3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_vstack_hstack() {
        let a = sample(1, 2);
        let b = sample(2, 2);
        let v = a.vstack(&b);
        assert_eq!(v.shape(), Shape::new(3, 2));
        assert_eq!(v.data(), &[0.0, 1.0, 0.0, 1.0, 2.0, 3.0]);

        let c = sample(2, 1);
        let h = b.hstack(&c);
        assert_eq!(h.shape(), Shape::new(2, 3));
        assert_eq!(h.data(), &[0.0, 1.0, 0.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    #[should_panic(expected = "hstack: row mismatch")]
    fn test_hstack_mismatch() {
        let _ = sample(2, 2).hstack(&sample(3, 1));
    }

    #[test]
    fn test_stack() {
        let a = Dense::row_vector(&[1.0f32, 2.0]);
        let b = Dense::vector(&[3.0f32, 4.0]);
        let s = Dense::stack(&[&a, &b]);
        assert_eq!(s.shape(), Shape::new(2, 2));
        assert_eq!(s.data(), &[1.0, 2.0, 3.0, 4.0]);

        let empty: [&Dense<f32>; 0] = [];
        assert_eq!(Dense::stack(&empty).shape(), Shape::new(0, 0));
    }

    #[test]
    fn test_concat_and_split() {
        let a = Dense::row_vector(&[1.0f64, 2.0]);
        let b = Dense::vector(&[3.0f64, 4.0, 5.0]);
        let c = Dense::concat(&[a.view(1, 2), b.view(1, 3)]);
        assert_eq!(c.shape(), Shape::new(5, 1));
        assert_eq!(c.data(), &[1.0, 2.0, 3.0, 4.0, 5.0]);

        let parts = c.split_vector(&[2, 0, 3]);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].data(), &[1.0, 2.0]);
        assert_eq!(parts[1].size(), 0);
        assert_eq!(parts[2].data(), &[3.0, 4.0, 5.0]);
    }

    #[test]
    #[should_panic(expected = "split_vector: sizes add up to 4")]
    fn test_split_vector_bad_sizes() {
        let _ = sample(1, 5).split_vector(&[2, 2]);
    }

    #[test]
    fn test_swap_rows_in_place() {
        let mut t = sample(3, 2);
        t.swap_rows_in_place(2, 0);
        assert_eq!(t.data(), &[4.0, 5.0, 2.0, 3.0, 0.0, 1.0]);
        t.swap_rows_in_place(1, 1);
        assert_eq!(t.at(1, 0), 2.0);
    }
}
