use std::fmt;
use std::iter::Sum;
use std::sync::OnceLock;

use num_traits::Float;

use crate::pool::Pool;

/// Element types a [`Dense`](crate::Dense) tensor can hold.
///
/// Exactly two widths are supported: IEEE 754 single and double precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// 32-bit IEEE 754 single-precision float
    F32,
    /// 64-bit IEEE 754 double-precision float
    F64,
}

impl DType {
    /// Size in bytes of a single element.
    pub fn element_size(&self) -> usize {
        match self {
            DType::F32 => 4,
            DType::F64 => 8,
        }
    }

    /// Number of bytes needed to store `n` elements, or `None` on overflow.
    pub fn storage_bytes(&self, n: usize) -> Option<usize> {
        n.checked_mul(self.element_size())
    }

    /// Four-bit tag used by the binary codec.
    pub fn tag(&self) -> u8 {
        match self {
            DType::F32 => 0x1,
            DType::F64 => 0x2,
        }
    }

    /// Inverse of [`DType::tag`].
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x1 => Some(DType::F32),
            0x2 => Some(DType::F64),
            _ => None,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::F32 => write!(f, "f32"),
            DType::F64 => write!(f, "f64"),
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// The closed set of floating-point types every kernel is generic over.
///
/// This trait is sealed: it is implemented for `f32` and `f64` only, and every
/// operation is monomorphised for each of them.
pub trait Element:
    Float
    + bytemuck::Pod
    + Default
    + Sum
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + 'static
    + sealed::Sealed
{
    /// Runtime tag for this element type.
    const DTYPE: DType;

    /// Convert from `f64`, rounding to the nearest representable value.
    fn from_f64_lossy(v: f64) -> Self;

    /// Append the little-endian IEEE 754 encoding of `self` to `out`.
    fn write_le(self, out: &mut Vec<u8>);

    /// Decode a value from exactly `DTYPE.element_size()` little-endian bytes.
    ///
    /// # Panics
    /// Panics if `bytes` has the wrong length.
    fn read_le(bytes: &[u8]) -> Self;

    /// Slot holding the process-wide pool for this element type. Use
    /// [`pool::global`](crate::pool::global) and
    /// [`pool::init_global`](crate::pool::init_global) instead.
    #[doc(hidden)]
    fn global_cell() -> &'static OnceLock<Pool<Self>>;
}

macro_rules! impl_element {
    ($t:ty, $dtype:expr, $n:expr) => {
        impl Element for $t {
            const DTYPE: DType = $dtype;

            #[allow(clippy::cast_possible_truncation)]
            fn from_f64_lossy(v: f64) -> Self {
                v as $t
            }

            fn write_le(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }

            fn read_le(bytes: &[u8]) -> Self {
                let mut buf = [0u8; $n];
                buf.copy_from_slice(bytes);
                <$t>::from_le_bytes(buf)
            }

            fn global_cell() -> &'static OnceLock<Pool<Self>> {
                static POOL: OnceLock<Pool<$t>> = OnceLock::new();
                &POOL
            }
        }
    };
}

impl_element!(f32, DType::F32, 4);
impl_element!(f64, DType::F64, 8);
