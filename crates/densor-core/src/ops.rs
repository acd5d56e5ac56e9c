//! Tensor operations: arithmetic, reduction, manipulation.
//!
//! Allocating operations draw their output from the global pool. In-place
//! variants are suffixed with `_in_place` and overwrite the receiver.

pub mod arithmetic;
pub mod manipulation;
pub mod reduction;

use rayon::prelude::*;

use crate::element::Element;

/// Element count above which elementwise kernels and matrix products run on
/// the rayon thread pool. Reductions always run sequentially.
pub const PAR_THRESHOLD: usize = 8192;

pub(crate) fn map_into<T: Element>(out: &mut [T], src: &[T], op: impl Fn(T) -> T + Sync) {
    debug_assert_eq!(out.len(), src.len());
    if out.len() >= PAR_THRESHOLD {
        out.par_iter_mut()
            .zip(src.par_iter())
            .for_each(|(o, &a)| *o = op(a));
    } else {
        for (o, &a) in out.iter_mut().zip(src) {
            *o = op(a);
        }
    }
}

pub(crate) fn zip_into<T: Element>(
    out: &mut [T],
    lhs: &[T],
    rhs: &[T],
    op: impl Fn(T, T) -> T + Sync,
) {
    debug_assert_eq!(out.len(), lhs.len());
    debug_assert_eq!(out.len(), rhs.len());
    if out.len() >= PAR_THRESHOLD {
        out.par_iter_mut()
            .zip(lhs.par_iter().zip(rhs.par_iter()))
            .for_each(|(o, (&a, &b))| *o = op(a, b));
    } else {
        for (o, (&a, &b)) in out.iter_mut().zip(lhs.iter().zip(rhs)) {
            *o = op(a, b);
        }
    }
}

pub(crate) fn map_in_place<T: Element>(data: &mut [T], op: impl Fn(T) -> T + Sync) {
    if data.len() >= PAR_THRESHOLD {
        data.par_iter_mut().for_each(|v| *v = op(*v));
    } else {
        for v in data.iter_mut() {
            *v = op(*v);
        }
    }
}

pub(crate) fn zip_in_place<T: Element>(data: &mut [T], rhs: &[T], op: impl Fn(T, T) -> T + Sync) {
    debug_assert_eq!(data.len(), rhs.len());
    if data.len() >= PAR_THRESHOLD {
        data.par_iter_mut()
            .zip(rhs.par_iter())
            .for_each(|(a, &b)| *a = op(*a, b));
    } else {
        for (a, &b) in data.iter_mut().zip(rhs) {
            *a = op(*a, b);
        }
    }
}
