use crate::element::Element;
use crate::shape::{self, Shape};

/// Read access to a row-major matrix, owned or borrowed.
///
/// Implemented by [`Dense`](crate::Dense) and by the borrowed views
/// [`DenseView`](crate::DenseView) and [`DenseViewMut`](crate::DenseViewMut),
/// so any of them can be the right-hand operand of a kernel.
pub trait Matrix<T: Element> {
    fn rows(&self) -> usize;

    fn cols(&self) -> usize;

    /// The elements in row-major order; `data().len() == rows() * cols()`.
    fn data(&self) -> &[T];

    /// Whether this header borrows another tensor's buffer.
    fn is_view(&self) -> bool {
        false
    }

    fn shape(&self) -> Shape {
        Shape::new(self.rows(), self.cols())
    }

    fn size(&self) -> usize {
        self.data().len()
    }

    fn is_vector(&self) -> bool {
        self.shape().is_vector()
    }

    fn is_scalar(&self) -> bool {
        self.shape().is_scalar()
    }

    fn is_square(&self) -> bool {
        self.shape().is_square()
    }

    /// Element at `(row, col)`.
    ///
    /// # Panics
    /// Panics if the index is out of range.
    #[track_caller]
    fn at(&self, row: usize, col: usize) -> T {
        shape::assert_in_bounds("at", self.shape(), row, col);
        self.data()[row * self.cols() + col]
    }

    /// Element `i` of a row or column vector.
    ///
    /// # Panics
    /// Panics if `self` is not a vector or `i` is out of range.
    #[track_caller]
    fn at_vec(&self, i: usize) -> T {
        shape::assert_vector("at_vec", self.shape());
        assert!(
            i < self.size(),
            "at_vec: index {i} out of range for vector of length {}",
            self.size()
        );
        self.data()[i]
    }
}

impl<T: Element, M: Matrix<T> + ?Sized> Matrix<T> for &M {
    fn rows(&self) -> usize {
        (**self).rows()
    }

    fn cols(&self) -> usize {
        (**self).cols()
    }

    fn data(&self) -> &[T] {
        (**self).data()
    }

    fn is_view(&self) -> bool {
        (**self).is_view()
    }
}

/// Write access to a row-major matrix, owned or borrowed.
pub trait MatrixMut<T: Element>: Matrix<T> {
    fn data_mut(&mut self) -> &mut [T];

    /// Overwrite the element at `(row, col)`.
    ///
    /// # Panics
    /// Panics if the index is out of range.
    #[track_caller]
    fn set(&mut self, row: usize, col: usize, value: T) {
        shape::assert_in_bounds("set", self.shape(), row, col);
        let cols = self.cols();
        self.data_mut()[row * cols + col] = value;
    }

    /// Overwrite element `i` of a row or column vector.
    ///
    /// # Panics
    /// Panics if `self` is not a vector or `i` is out of range.
    #[track_caller]
    fn set_vec(&mut self, i: usize, value: T) {
        shape::assert_vector("set_vec", self.shape());
        assert!(
            i < self.size(),
            "set_vec: index {i} out of range for vector of length {}",
            self.size()
        );
        self.data_mut()[i] = value;
    }

    fn fill(&mut self, value: T) {
        self.data_mut().fill(value);
    }

    /// Copy every element of `other` into `self`.
    ///
    /// # Panics
    /// Panics if the shapes differ.
    #[track_caller]
    fn copy_from(&mut self, other: &impl Matrix<T>) {
        shape::assert_same_shape("copy_from", self.shape(), other.shape());
        self.data_mut().copy_from_slice(other.data());
    }
}
