//! Borrowed views over a tensor's buffer.
//!
//! A view is a `rows × cols` header over another tensor's elements with the
//! same total size. Nothing is copied: writes through a [`DenseViewMut`] land in
//! the owner's buffer, and the borrow checker keeps the owner from being
//! mutated, moved, or returned to its pool while a view is alive.

use std::fmt;

use crate::dense::Dense;
use crate::element::Element;
use crate::matrix::{Matrix, MatrixMut};
use crate::shape::{self, Shape};

/// Shared, read-only view.
#[derive(Clone, Copy)]
pub struct DenseView<'a, T: Element> {
    rows: usize,
    cols: usize,
    data: &'a [T],
}

/// Exclusive, writable view.
pub struct DenseViewMut<'a, T: Element> {
    rows: usize,
    cols: usize,
    data: &'a mut [T],
}

impl<'a, T: Element> DenseView<'a, T> {
    /// View `data` as a `rows × cols` matrix.
    ///
    /// # Panics
    /// Panics if `data.len() != rows * cols`.
    #[track_caller]
    pub fn new(rows: usize, cols: usize, data: &'a [T]) -> Self {
        shape::assert_same_size("view", Shape::new(1, data.len()), Shape::new(rows, cols));
        Self { rows, cols, data }
    }

    /// Re-view the same elements with another shape of equal size.
    #[track_caller]
    pub fn view(&self, rows: usize, cols: usize) -> DenseView<'a, T> {
        DenseView::new(rows, cols, self.data)
    }

    /// Deep copy into a pooled tensor.
    pub fn to_dense(&self) -> Dense<T> {
        Dense::new(self.rows, self.cols, self.data)
    }
}

impl<'a, T: Element> DenseViewMut<'a, T> {
    /// View `data` as a writable `rows × cols` matrix.
    ///
    /// # Panics
    /// Panics if `data.len() != rows * cols`.
    #[track_caller]
    pub fn new(rows: usize, cols: usize, data: &'a mut [T]) -> Self {
        shape::assert_same_size("view_mut", Shape::new(1, data.len()), Shape::new(rows, cols));
        Self { rows, cols, data }
    }

    /// Reborrow as a read-only view.
    pub fn as_view(&self) -> DenseView<'_, T> {
        DenseView {
            rows: self.rows,
            cols: self.cols,
            data: &*self.data,
        }
    }

    /// Deep copy into a pooled tensor.
    pub fn to_dense(&self) -> Dense<T> {
        Dense::new(self.rows, self.cols, &*self.data)
    }
}

impl<T: Element> Matrix<T> for DenseView<'_, T> {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn data(&self) -> &[T] {
        self.data
    }

    fn is_view(&self) -> bool {
        true
    }
}

impl<T: Element> Matrix<T> for DenseViewMut<'_, T> {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn data(&self) -> &[T] {
        &*self.data
    }

    fn is_view(&self) -> bool {
        true
    }
}

impl<T: Element> MatrixMut<T> for DenseViewMut<'_, T> {
    fn data_mut(&mut self) -> &mut [T] {
        &mut *self.data
    }
}

impl<T: Element> fmt::Debug for DenseView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DenseView(shape={}, dtype={})", self.shape(), T::DTYPE)
    }
}

impl<T: Element> fmt::Debug for DenseViewMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DenseViewMut(shape={}, dtype={})", self.shape(), T::DTYPE)
    }
}

impl<T: Element> fmt::Display for DenseView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::format::write_matrix(f, self)
    }
}

impl<T: Element> fmt::Display for DenseViewMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::format::write_matrix(f, self)
    }
}
