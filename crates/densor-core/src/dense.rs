use std::fmt;

use rand::distributions::uniform::SampleUniform;
use rand::Rng;

use crate::element::Element;
use crate::error::DensorError;
use crate::grad::GradSlot;
use crate::matrix::{Matrix, MatrixMut};
use crate::pool::{self, Pool};
use crate::shape::{self, Shape};
use crate::view::{DenseView, DenseViewMut};
use crate::Result;

/// A dense row-major matrix, the fundamental data structure in densor.
///
/// Vectors are matrices with one row or one column, and a scalar is a 1×1
/// matrix. A `Dense` owns its buffer; [`view`](Dense::view) and
/// [`view_mut`](Dense::view_mut) borrow it without copying, while
/// [`clone`](Clone::clone), [`reshape`](Dense::reshape) and friends copy.
///
/// Every tensor also carries a gradient slot that an autodiff layer can
/// accumulate into from several threads at once (see the `grad` methods).
///
/// # Examples
///
/// ```
/// use densor_core::prelude::*;
///
/// let a = Dense::new(2, 2, &[1.0f32, 2.0, 3.0, 4.0]);
/// let b = Dense::new(2, 2, &[10.0f32, 20.0, 30.0, 40.0]);
/// let c = a.add(&b);
/// assert_eq!(c.data(), &[11.0, 22.0, 33.0, 44.0]);
/// assert_eq!(c.shape(), Shape::new(2, 2));
/// ```
pub struct Dense<T: Element> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
    from_pool: bool,
    fresh_from_pool: bool,
    requires_grad: bool,
    pub(crate) grad: GradSlot<T>,
}

impl<T: Element> Dense<T> {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a `rows × cols` tensor holding a copy of `data`.
    ///
    /// The buffer comes from the global pool for `T`.
    ///
    /// # Panics
    /// Panics if `data.len() != rows * cols`.
    #[track_caller]
    pub fn new(rows: usize, cols: usize, data: &[T]) -> Self {
        Self::new_in(pool::global::<T>(), rows, cols, data)
    }

    /// Like [`new`](Dense::new), drawing the buffer from `pool` instead of
    /// the global one.
    ///
    /// # Panics
    /// Panics if `data.len() != rows * cols`.
    #[track_caller]
    pub fn new_in(pool: &Pool<T>, rows: usize, cols: usize, data: &[T]) -> Self {
        let s = Shape::new(rows, cols);
        assert!(
            s.checked_size() == Some(data.len()),
            "new: shape {s} requires {} elements, got {}",
            rows.saturating_mul(cols),
            data.len()
        );
        let mut t = pool.get(rows, cols);
        t.data_mut().copy_from_slice(data);
        t
    }

    /// Wrap an existing buffer without copying. The tensor is not pooled.
    ///
    /// # Panics
    /// Panics if `data.len() != rows * cols`.
    #[track_caller]
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Self {
        match Self::try_from_vec(rows, cols, data) {
            Ok(t) => t,
            Err(e) => panic!("from_vec: {e}"),
        }
    }

    /// Wrap an existing buffer, reporting a length mismatch as an error.
    pub fn try_from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        let s = Shape::new(rows, cols);
        if s.checked_size() != Some(data.len()) {
            return Err(DensorError::DataLength {
                shape: s,
                len: data.len(),
            });
        }
        Ok(Self::from_parts(rows, cols, data, false))
    }

    /// Pooled `rows × cols` tensor with unspecified contents.
    pub fn empty(rows: usize, cols: usize) -> Self {
        pool::global::<T>().get(rows, cols)
    }

    /// Pooled `rows × cols` tensor of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        pool::global::<T>().get_empty(rows, cols)
    }

    /// Pooled `rows × cols` tensor of ones.
    pub fn ones(rows: usize, cols: usize) -> Self {
        Self::full(rows, cols, T::one())
    }

    /// Pooled `rows × cols` tensor with every element set to `value`.
    pub fn full(rows: usize, cols: usize, value: T) -> Self {
        let mut t = Self::empty(rows, cols);
        t.data_mut().fill(value);
        t
    }

    /// Pooled tensor whose element `(r, c)` is `f(r, c)`.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut t = Self::empty(rows, cols);
        if cols > 0 {
            for (i, v) in t.data_mut().iter_mut().enumerate() {
                *v = f(i / cols, i % cols);
            }
        }
        t
    }

    /// The `n × n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut t = Self::zeros(n, n);
        let data = t.data_mut();
        for i in 0..n {
            data[i * n + i] = T::one();
        }
        t
    }

    /// Column vector of length `size` with a one at `index` and zeros elsewhere.
    ///
    /// # Panics
    /// Panics if `index >= size`.
    #[track_caller]
    pub fn one_hot(size: usize, index: usize) -> Self {
        assert!(
            index < size,
            "one_hot: index {index} out of range for size {size}"
        );
        let mut t = Self::zeros(size, 1);
        t.data_mut()[index] = T::one();
        t
    }

    /// Column vector holding a copy of `data`.
    pub fn vector(data: &[T]) -> Self {
        Self::new(data.len(), 1, data)
    }

    /// Row vector holding a copy of `data`.
    pub fn row_vector(data: &[T]) -> Self {
        Self::new(1, data.len(), data)
    }

    /// 1×1 tensor.
    pub fn scalar(value: T) -> Self {
        Self::full(1, 1, value)
    }

    /// Tensor with values drawn uniformly from `[low, high)`.
    ///
    /// # Panics
    /// Panics if `low >= high`.
    pub fn random_uniform<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        low: T,
        high: T,
        rng: &mut R,
    ) -> Self
    where
        T: SampleUniform,
    {
        let mut t = Self::empty(rows, cols);
        for v in t.data_mut() {
            *v = rng.gen_range(low..high);
        }
        t
    }

    /// Pooled tensor of zeros with the same shape as `self`.
    pub fn zeros_like(&self) -> Self {
        Self::zeros(self.rows, self.cols)
    }

    /// Pooled tensor with the same shape as `self` and unspecified contents.
    pub fn empty_like(&self) -> Self {
        Self::empty(self.rows, self.cols)
    }

    /// Builder-style setter for [`requires_grad`](Dense::requires_grad).
    pub fn with_requires_grad(mut self, requires_grad: bool) -> Self {
        self.requires_grad = requires_grad;
        self
    }

    pub(crate) fn from_pool_parts(rows: usize, cols: usize, data: Vec<T>) -> Self {
        let mut t = Self::from_parts(rows, cols, data, true);
        t.fresh_from_pool = true;
        t
    }

    fn from_parts(rows: usize, cols: usize, data: Vec<T>, from_pool: bool) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self {
            rows,
            cols,
            data,
            from_pool,
            fresh_from_pool: false,
            requires_grad: false,
            grad: GradSlot::default(),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> Shape {
        Shape::new(self.rows, self.cols)
    }

    /// Total number of elements.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the buffer was checked out of a pool and may be handed back
    /// with [`Pool::put`](crate::Pool::put).
    pub fn is_from_pool(&self) -> bool {
        self.from_pool
    }

    /// Whether the tensor came from a pool and has not been written through
    /// its own handle since.
    pub fn is_fresh_from_pool(&self) -> bool {
        self.fresh_from_pool
    }

    /// Whether the autodiff layer should track gradients for this tensor.
    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// Set whether gradients are tracked. Does not touch the gradient slot.
    pub fn set_requires_grad(&mut self, requires_grad: bool) {
        self.requires_grad = requires_grad;
    }

    // =========================================================================
    // Data access
    // =========================================================================

    /// The elements in row-major order.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable access to the elements in row-major order.
    pub fn data_mut(&mut self) -> &mut [T] {
        self.fresh_from_pool = false;
        &mut self.data
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.data.clone()
    }

    /// Consume the tensor, returning its buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// The single element of a 1×1 tensor.
    ///
    /// # Panics
    /// Panics if `self` is not 1×1.
    #[track_caller]
    pub fn scalar_value(&self) -> T {
        assert!(
            self.shape().is_scalar(),
            "scalar_value: expected a 1x1 matrix, got {}",
            self.shape()
        );
        self.data[0]
    }

    /// Rows as nested vectors, mainly for tests and diagnostics.
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        if self.cols == 0 {
            return vec![Vec::new(); self.rows];
        }
        self.data.chunks(self.cols).map(<[T]>::to_vec).collect()
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Borrow the buffer as a `rows × cols` matrix without copying.
    ///
    /// # Panics
    /// Panics if `rows * cols != self.size()`.
    #[track_caller]
    pub fn view(&self, rows: usize, cols: usize) -> DenseView<'_, T> {
        shape::assert_same_size("view", self.shape(), Shape::new(rows, cols));
        DenseView::new(rows, cols, &self.data)
    }

    /// Mutably borrow the buffer as a `rows × cols` matrix without copying.
    /// Writes through the view are visible in `self` once the view is dropped.
    ///
    /// # Panics
    /// Panics if `rows * cols != self.size()`.
    #[track_caller]
    pub fn view_mut(&mut self, rows: usize, cols: usize) -> DenseViewMut<'_, T> {
        shape::assert_same_size("view_mut", self.shape(), Shape::new(rows, cols));
        DenseViewMut::new(rows, cols, self.data_mut())
    }

    /// Set the declared shape. The caller guarantees the size is unchanged.
    pub(crate) fn set_shape(&mut self, rows: usize, cols: usize) {
        debug_assert_eq!(rows * cols, self.data.len());
        self.rows = rows;
        self.cols = cols;
    }
}

impl<T: Element> Matrix<T> for Dense<T> {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn data(&self) -> &[T] {
        &self.data
    }
}

impl<T: Element> MatrixMut<T> for Dense<T> {
    fn data_mut(&mut self) -> &mut [T] {
        Dense::data_mut(self)
    }
}

/// Deep copy into a pooled buffer. The gradient slot is not copied and the
/// clone starts with an empty one; `requires_grad` is preserved.
impl<T: Element> Clone for Dense<T> {
    fn clone(&self) -> Self {
        let mut t = Dense::new(self.rows, self.cols, &self.data);
        t.requires_grad = self.requires_grad;
        t
    }
}

/// Shapes equal and elements equal under IEEE 754 comparison (so a tensor
/// holding NaN is not equal to itself).
impl<T: Element> PartialEq for Dense<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.data == other.data
    }
}

impl<T: Element> fmt::Debug for Dense<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dense(shape={}, dtype={}, from_pool={}, requires_grad={})",
            self.shape(),
            T::DTYPE,
            self.from_pool,
            self.requires_grad,
        )
    }
}

impl<T: Element> fmt::Display for Dense<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::format::write_matrix(f, self)
    }
}
