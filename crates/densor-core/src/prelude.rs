//! Convenience re-exports for common densor-core types.
//!
//! ```rust
//! use densor_core::prelude::*;
//! ```

pub use crate::Dense;
pub use crate::DenseView;
pub use crate::DenseViewMut;
pub use crate::DensorError;
pub use crate::Element;
pub use crate::Matrix;
pub use crate::MatrixMut;
pub use crate::Pool;
pub use crate::Result;
pub use crate::Shape;
