use std::fmt;

/// Two-dimensional row-major shape: `rows × cols`.
///
/// Vectors are matrices with a single row or a single column; a scalar is a
/// 1×1 matrix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl Shape {
    /// Create a new shape.
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total number of elements.
    ///
    /// # Panics
    /// Panics if `rows * cols` overflows `usize`.
    pub fn size(&self) -> usize {
        self.rows
            .checked_mul(self.cols)
            .unwrap_or_else(|| panic!("shape {self} overflows usize"))
    }

    /// Total number of elements, or `None` on overflow.
    pub fn checked_size(&self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }

    /// Whether this is a row or column vector (including 1×0 and 0×1).
    pub fn is_vector(&self) -> bool {
        self.rows == 1 || self.cols == 1
    }

    /// Whether this is a 1×1 matrix.
    pub fn is_scalar(&self) -> bool {
        self.rows == 1 && self.cols == 1
    }

    /// Whether `rows == cols`.
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Whether the shape holds no elements.
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// The shape with rows and columns swapped.
    pub fn transposed(&self) -> Shape {
        Shape::new(self.cols, self.rows)
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape([{}, {}])", self.rows, self.cols)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.rows, self.cols)
    }
}

impl From<(usize, usize)> for Shape {
    fn from((rows, cols): (usize, usize)) -> Self {
        Shape::new(rows, cols)
    }
}

impl From<[usize; 2]> for Shape {
    fn from(dims: [usize; 2]) -> Self {
        Shape::new(dims[0], dims[1])
    }
}

// Contract checks shared by every kernel. They abort the current operation
// because a failure here is a caller bug, not a runtime condition.

#[track_caller]
pub(crate) fn assert_same_shape(op: &str, a: Shape, b: Shape) {
    assert!(a == b, "{op}: shape mismatch: {a} vs {b}");
}

#[track_caller]
pub(crate) fn assert_same_size(op: &str, from: Shape, to: Shape) {
    assert!(
        from.checked_size().is_some() && from.checked_size() == to.checked_size(),
        "{op}: cannot reshape {from} ({} elements) into {to}",
        from.rows.saturating_mul(from.cols)
    );
}

#[track_caller]
pub(crate) fn assert_square(op: &str, s: Shape) {
    assert!(s.is_square(), "{op}: expected a square matrix, got {s}");
}

#[track_caller]
pub(crate) fn assert_vector(op: &str, s: Shape) {
    assert!(s.is_vector(), "{op}: expected a vector, got {s}");
}

#[track_caller]
pub(crate) fn assert_in_bounds(op: &str, s: Shape, row: usize, col: usize) {
    assert!(
        row < s.rows && col < s.cols,
        "{op}: index ({row}, {col}) out of range for shape {s}"
    );
}
