//! Reduction operations: sum, mean, max, min, argmax, softmax, cumsum, norms.
//!
//! Reductions run sequentially in row-major order, so results are
//! bit-for-bit reproducible across runs and thread counts.

use crate::dense::Dense;
use crate::element::Element;
use crate::matrix::Matrix;
use crate::shape;

impl<T: Element> Dense<T> {
    /// Sum of all elements; `0` for an empty tensor.
    pub fn sum(&self) -> T {
        self.data().iter().fold(T::zero(), |acc, &v| acc + v)
    }

    /// Arithmetic mean of all elements; `NaN` for an empty tensor.
    pub fn mean(&self) -> T {
        self.sum() / T::from_f64_lossy(self.size() as f64)
    }

    /// Largest element; `-inf` for an empty tensor. `NaN` elements are skipped.
    pub fn max(&self) -> T {
        self.data().iter().fold(T::neg_infinity(), |acc, &v| acc.max(v))
    }

    /// Smallest element; `+inf` for an empty tensor. `NaN` elements are skipped.
    pub fn min(&self) -> T {
        self.data().iter().fold(T::infinity(), |acc, &v| acc.min(v))
    }

    /// Flat row-major index of the first occurrence of the maximum.
    ///
    /// # Panics
    /// Panics if the tensor is empty.
    #[track_caller]
    pub fn argmax(&self) -> usize {
        let data = self.data();
        assert!(!data.is_empty(), "argmax: empty tensor {}", self.shape());
        let mut best = 0;
        for (i, &v) in data.iter().enumerate().skip(1) {
            if v > data[best] || (data[best].is_nan() && !v.is_nan()) {
                best = i;
            }
        }
        best
    }

    /// Numerically stable softmax of a vector, returned as a column vector.
    ///
    /// The maximum is subtracted before exponentiating, so the result is
    /// unchanged by adding a constant to every input.
    ///
    /// # Panics
    /// Panics if `self` is not a vector.
    #[track_caller]
    pub fn softmax(&self) -> Dense<T> {
        shape::assert_vector("softmax", self.shape());
        let max = self.max();
        let mut out = Dense::empty(self.size(), 1);
        let mut total = T::zero();
        for (o, &v) in out.data_mut().iter_mut().zip(self.data()) {
            *o = (v - max).exp();
            total = total + *o;
        }
        out.div_scalar_in_place(total);
        out
    }

    /// Running prefix sum of a vector; same shape as `self`.
    ///
    /// # Panics
    /// Panics if `self` is not a vector.
    #[track_caller]
    pub fn cumsum(&self) -> Dense<T> {
        shape::assert_vector("cumsum", self.shape());
        let mut out = Dense::empty(self.rows(), self.cols());
        let mut acc = T::zero();
        for (o, &v) in out.data_mut().iter_mut().zip(self.data()) {
            acc = acc + v;
            *o = acc;
        }
        out
    }

    /// Entrywise `p`-norm `(Σ |x|^p)^(1/p)`. `p = inf` gives the largest
    /// absolute value.
    pub fn norm(&self, p: T) -> T {
        if p.is_infinite() {
            return self.data().iter().fold(T::zero(), |acc, &v| acc.max(v.abs()));
        }
        if p == T::from_f64_lossy(2.0) {
            return self
                .data()
                .iter()
                .fold(T::zero(), |acc, &v| acc + v * v)
                .sqrt();
        }
        self.data()
            .iter()
            .fold(T::zero(), |acc, &v| acc + v.abs().powf(p))
            .powf(p.recip())
    }

    /// `self` scaled to unit Euclidean norm. A zero tensor yields `NaN`s.
    pub fn normalize2(&self) -> Dense<T> {
        self.div_scalar(self.norm(T::from_f64_lossy(2.0)))
    }

    /// Dot product of two vectors of equal length, read with unit stride.
    /// Row and column vectors may be mixed.
    ///
    /// # Panics
    /// Panics if either operand is not a vector or the lengths differ.
    #[track_caller]
    pub fn dot_unitary(&self, other: &impl Matrix<T>) -> T {
        shape::assert_vector("dot_unitary", self.shape());
        shape::assert_vector("dot_unitary", other.shape());
        assert!(
            self.size() == other.size(),
            "dot_unitary: length mismatch: {} vs {}",
            self.size(),
            other.size()
        );
        self.data()
            .iter()
            .zip(other.data())
            .fold(T::zero(), |acc, (&a, &b)| acc + a * b)
    }
}
