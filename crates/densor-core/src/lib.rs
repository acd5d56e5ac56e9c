//! # densor-core
//!
//! Dense numeric tensor engine.
//!
//! Provides the row-major [`Dense`] matrix type with:
//! - `f32` and `f64` elements through the sealed [`Element`] trait
//! - Size-bucketed buffer pooling ([`Pool`])
//! - Zero-copy borrowed views ([`DenseView`], [`DenseViewMut`])
//! - A lock-protected gradient slot for concurrent accumulation
//! - Elementwise, reduction and structural kernels, parallelised with rayon
//! - LU decomposition with partial pivoting and matrix inversion
//! - A fixed-layout binary codec

pub mod codec;
pub mod dense;
pub mod element;
pub mod error;
mod format;
mod grad;
pub mod linalg;
pub mod matrix;
pub mod ops;
pub mod pool;
pub mod prelude;
pub mod shape;
pub mod view;

pub use dense::Dense;
pub use element::{DType, Element};
pub use error::DensorError;
pub use linalg::{Lu, Pivot};
pub use matrix::{Matrix, MatrixMut};
pub use pool::{Pool, PoolConfig, PoolStats};
pub use shape::Shape;
pub use view::{DenseView, DenseViewMut};

pub type Result<T> = std::result::Result<T, DensorError>;
