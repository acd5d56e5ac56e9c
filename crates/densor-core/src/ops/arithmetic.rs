//! Element-wise arithmetic and matrix products.

use rayon::prelude::*;

use crate::dense::Dense;
use crate::element::Element;
use crate::matrix::Matrix;
use crate::ops::{map_in_place, map_into, zip_in_place, zip_into, PAR_THRESHOLD};
use crate::shape::{self, Shape};

macro_rules! binary_ops {
    ($($(#[$doc:meta])* $name:ident, $in_place:ident => $op:expr;)*) => {
        impl<T: Element> Dense<T> {
            $(
                $(#[$doc])*
                ///
                /// # Panics
                /// Panics if the shapes differ.
                #[track_caller]
                pub fn $name(&self, other: &impl Matrix<T>) -> Dense<T> {
                    shape::assert_same_shape(stringify!($name), self.shape(), other.shape());
                    let mut out = Dense::empty(self.rows(), self.cols());
                    zip_into(out.data_mut(), self.data(), other.data(), $op);
                    out
                }

                #[doc = concat!("In-place [`", stringify!($name), "`](Dense::", stringify!($name), ").")]
                ///
                /// # Panics
                /// Panics if the shapes differ.
                #[track_caller]
                pub fn $in_place(&mut self, other: &impl Matrix<T>) {
                    shape::assert_same_shape(stringify!($in_place), self.shape(), other.shape());
                    zip_in_place(self.data_mut(), other.data(), $op);
                }
            )*
        }
    };
}

binary_ops! {
    /// Element-wise addition: `self + other`.
    add, add_in_place => |a: T, b: T| a + b;
    /// Element-wise subtraction: `self - other`.
    sub, sub_in_place => |a: T, b: T| a - b;
    /// Element-wise (Hadamard) product.
    prod, prod_in_place => |a: T, b: T| a * b;
    /// Element-wise division. Division by zero yields `±inf` or `NaN`.
    div, div_in_place => |a: T, b: T| a / b;
    /// Element-wise maximum. A `NaN` on one side yields the other operand.
    maximum, maximum_in_place => |a: T, b: T| a.max(b);
    /// Element-wise minimum. A `NaN` on one side yields the other operand.
    minimum, minimum_in_place => |a: T, b: T| a.min(b);
}

macro_rules! scalar_ops {
    ($($name:ident, $in_place:ident => $op:tt;)*) => {
        impl<T: Element> Dense<T> {
            $(
                #[doc = concat!("Apply `x ", stringify!($op), " scalar` to every element.")]
                pub fn $name(&self, scalar: T) -> Dense<T> {
                    self.apply(|a| a $op scalar)
                }

                pub fn $in_place(&mut self, scalar: T) {
                    self.apply_in_place(|a| a $op scalar);
                }
            )*
        }
    };
}

scalar_ops! {
    add_scalar, add_scalar_in_place => +;
    sub_scalar, sub_scalar_in_place => -;
    prod_scalar, prod_scalar_in_place => *;
    div_scalar, div_scalar_in_place => /;
}

impl<T: Element> Dense<T> {
    /// New tensor with `op` applied to every element.
    pub fn apply(&self, op: impl Fn(T) -> T + Sync) -> Dense<T> {
        let mut out = Dense::empty(self.rows(), self.cols());
        map_into(out.data_mut(), self.data(), op);
        out
    }

    /// Apply `op` to every element in place.
    pub fn apply_in_place(&mut self, op: impl Fn(T) -> T + Sync) {
        map_in_place(self.data_mut(), op);
    }

    pub fn abs(&self) -> Dense<T> {
        self.apply(|a| a.abs())
    }

    pub fn neg(&self) -> Dense<T> {
        self.apply(|a| -a)
    }

    /// Element-wise power: `self^p`.
    pub fn pow(&self, p: T) -> Dense<T> {
        self.apply(|a| a.powf(p))
    }

    pub fn sqrt(&self) -> Dense<T> {
        self.apply(|a| a.sqrt())
    }

    /// Element-wise natural logarithm.
    pub fn log(&self) -> Dense<T> {
        self.apply(|a| a.ln())
    }

    pub fn exp(&self) -> Dense<T> {
        self.apply(|a| a.exp())
    }

    /// Logistic function `1 / (1 + e^-x)`.
    pub fn sigmoid(&self) -> Dense<T> {
        self.apply(|a| T::one() / (T::one() + (-a).exp()))
    }

    pub fn tanh(&self) -> Dense<T> {
        self.apply(|a| a.tanh())
    }

    /// New tensor with every element clamped to `[min, max]`.
    ///
    /// # Panics
    /// Panics if `max < min` or either bound is `NaN`.
    #[track_caller]
    pub fn clip(&self, min: T, max: T) -> Dense<T> {
        assert_clip_bounds("clip", min, max);
        self.apply(|a| clamp(a, min, max))
    }

    /// Clamp every element to `[min, max]` in place. `NaN` elements are kept.
    ///
    /// # Panics
    /// Panics if `max < min` or either bound is `NaN`.
    #[track_caller]
    pub fn clip_in_place(&mut self, min: T, max: T) {
        assert_clip_bounds("clip_in_place", min, max);
        self.apply_in_place(|a| clamp(a, min, max));
    }

    /// Matrix product: `(r × k) · (k × c) → (r × c)`.
    ///
    /// # Panics
    /// Panics if `self.cols() != other.rows()`.
    #[track_caller]
    pub fn mul(&self, other: &impl Matrix<T>) -> Dense<T> {
        assert!(
            self.cols() == other.rows(),
            "mul: inner dimension mismatch: {} x {}",
            self.shape(),
            other.shape()
        );
        let (k, c) = (self.cols(), other.cols());
        let a = self.data();
        let b = other.data();
        matmul_rows(Shape::new(self.rows(), c), k, |i, p| a[i * k + p], |p| {
            &b[p * c..(p + 1) * c]
        })
    }

    /// Transposed product `selfᵀ · other`: `(k × r)ᵀ · (k × c) → (r × c)`,
    /// without materializing the transpose.
    ///
    /// # Panics
    /// Panics if `self.rows() != other.rows()`.
    #[track_caller]
    pub fn mul_t(&self, other: &impl Matrix<T>) -> Dense<T> {
        assert!(
            self.rows() == other.rows(),
            "mul_t: inner dimension mismatch: {}ᵀ x {}",
            self.shape(),
            other.shape()
        );
        let (k, r, c) = (self.rows(), self.cols(), other.cols());
        let a = self.data();
        let b = other.data();
        matmul_rows(Shape::new(r, c), k, |i, p| a[p * r + i], |p| {
            &b[p * c..(p + 1) * c]
        })
    }
}

/// Row-wise `i-p-j` product kernel. `lhs(i, p)` is the left factor's element
/// in output row `i` and inner index `p`; `rhs_row(p)` is row `p` of the right
/// factor. Each output row is computed in the same order regardless of
/// threading, so results do not depend on the worker count.
fn matmul_rows<'b, T: Element>(
    out_shape: Shape,
    k: usize,
    lhs: impl Fn(usize, usize) -> T + Sync,
    rhs_row: impl Fn(usize) -> &'b [T] + Sync,
) -> Dense<T> {
    let mut out = Dense::zeros(out_shape.rows, out_shape.cols);
    if out.is_empty() {
        return out;
    }
    let row_kernel = |(i, out_row): (usize, &mut [T])| {
        for p in 0..k {
            let a = lhs(i, p);
            for (o, &b) in out_row.iter_mut().zip(rhs_row(p)) {
                *o = *o + a * b;
            }
        }
    };
    let cols = out_shape.cols;
    let work = out_shape.size().saturating_mul(k);
    if work >= PAR_THRESHOLD {
        out.data_mut().par_chunks_mut(cols).enumerate().for_each(row_kernel);
    } else {
        out.data_mut().chunks_mut(cols).enumerate().for_each(row_kernel);
    }
    out
}

#[track_caller]
fn assert_clip_bounds<T: Element>(op: &str, min: T, max: T) {
    assert!(min <= max, "{op}: invalid bounds: min {min} > max {max}");
}

fn clamp<T: Element>(v: T, min: T, max: T) -> T {
    if v < min {
        min
    } else if v > max {
        max
    } else {
        v
    }
}

// Operator overloads

impl<T: Element> std::ops::Add for &Dense<T> {
    type Output = Dense<T>;
    fn add(self, rhs: &Dense<T>) -> Dense<T> {
        Dense::add(self, rhs)
    }
}

impl<T: Element> std::ops::Sub for &Dense<T> {
    type Output = Dense<T>;
    fn sub(self, rhs: &Dense<T>) -> Dense<T> {
        Dense::sub(self, rhs)
    }
}

impl<T: Element> std::ops::Neg for &Dense<T> {
    type Output = Dense<T>;
    fn neg(self) -> Dense<T> {
        Dense::neg(self)
    }
}
