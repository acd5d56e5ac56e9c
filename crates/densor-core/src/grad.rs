//! Per-tensor gradient accumulator.
//!
//! Every [`Dense`] carries a gradient slot guarded by a reader-writer lock, so
//! an autodiff layer running on several threads can fold partial gradients
//! into the same parameter while other threads read it. The slot is empty
//! until the first [`acc_grad`](Dense::acc_grad) and is emptied again by
//! [`zero_grad`](Dense::zero_grad).

use parking_lot::RwLock;

use crate::dense::Dense;
use crate::element::Element;
use crate::matrix::Matrix;
use crate::shape;

/// Lock-protected storage for an accumulated gradient.
pub(crate) struct GradSlot<T: Element> {
    inner: RwLock<Option<Box<Dense<T>>>>,
}

impl<T: Element> Default for GradSlot<T> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }
}

impl<T: Element> Dense<T> {
    /// Accumulate `g` into this tensor's gradient (thread-safe).
    ///
    /// The first call stores a copy of `g`; later calls add `g` elementwise.
    /// The read-modify-write runs under an exclusive lock, so concurrent
    /// callers never lose an update. Allowed whether or not
    /// [`requires_grad`](Dense::requires_grad) is set.
    ///
    /// # Panics
    /// Panics if a gradient is already present and its shape differs from `g`.
    #[track_caller]
    pub fn acc_grad(&self, g: &impl Matrix<T>) {
        let mut slot = self.grad.inner.write();
        match slot.as_mut() {
            Some(existing) => {
                shape::assert_same_shape("acc_grad", existing.shape(), g.shape());
                existing.add_in_place(g);
            }
            None => {
                *slot = Some(Box::new(Dense::new(g.rows(), g.cols(), g.data())));
            }
        }
    }

    // Readers take the lock recursively so `grad`/`has_grad` may nest inside
    // `with_grad` even while a writer is queued.

    /// A copy of the current gradient, or `None` if nothing was accumulated.
    pub fn grad(&self) -> Option<Dense<T>> {
        self.grad.inner.read_recursive().as_deref().cloned()
    }

    /// Run `f` on the current gradient under a shared lock, without copying.
    ///
    /// `f` may call [`grad`](Dense::grad), [`has_grad`](Dense::has_grad) or
    /// `with_grad` on the same tensor. Calling [`acc_grad`](Dense::acc_grad)
    /// or [`zero_grad`](Dense::zero_grad) on it from inside `f` deadlocks.
    pub fn with_grad<R>(&self, f: impl FnOnce(Option<&Dense<T>>) -> R) -> R {
        let slot = self.grad.inner.read_recursive();
        f(slot.as_deref())
    }

    pub fn has_grad(&self) -> bool {
        self.grad.inner.read_recursive().is_some()
    }

    /// Discard the accumulated gradient.
    pub fn zero_grad(&self) {
        *self.grad.inner.write() = None;
    }
}
