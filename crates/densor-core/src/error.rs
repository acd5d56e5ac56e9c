use crate::element::DType;
use crate::shape::Shape;

/// Recoverable failures.
///
/// Contract violations (shape mismatches between operands, out-of-range
/// indices, non-square input to square-only algorithms) panic instead; this
/// type covers data that comes from outside the process, such as a serialized
/// tensor.
#[derive(Debug, thiserror::Error)]
pub enum DensorError {
    #[error("Data length {len} does not match shape {shape}")]
    DataLength { shape: Shape, len: usize },

    #[error("Shape {rows}x{cols} overflows the addressable element count")]
    DimensionOverflow { rows: u64, cols: u64 },

    #[error("Unknown tensor tag: {0:#04x}")]
    UnknownTag(u8),

    #[error("DType mismatch: expected {expected}, got {got}")]
    DTypeMismatch { expected: DType, got: DType },

    #[error("Payload length mismatch: expected {expected} bytes, got {got}")]
    PayloadLength { expected: usize, got: usize },

    #[error("Truncated input while reading {what}")]
    Truncated { what: &'static str },

    #[error("Expected a dense tensor, found a nil marker")]
    NilTensor,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DensorError {
    /// Whether the error was caused by malformed input rather than the
    /// underlying reader or writer.
    pub fn is_data_error(&self) -> bool {
        !matches!(self, DensorError::Io(_))
    }
}
