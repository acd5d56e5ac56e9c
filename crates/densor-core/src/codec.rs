//! Fixed-layout binary encoding for tensors.
//!
//! Layout:
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ Tag: u8                                       │
//! ├───────────────────────────────────────────────┤
//! │ Rows: u32 LE (u64 LE if wide)                 │  absent for nil
//! │ Cols: u32 LE (u64 LE if wide)                 │
//! ├───────────────────────────────────────────────┤
//! │ rows * cols elements, IEEE 754 LE             │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! The tag is `0x00` for a nil tensor. Dense tags carry the dimension width
//! in the high nibble (`0x1_` four bytes, `0x2_` eight bytes) and the element
//! type in the low nibble (`1` = f32, `2` = f64).

use std::io::{self, Read, Write};

use crate::dense::Dense;
use crate::element::{DType, Element};
use crate::error::DensorError;
use crate::matrix::Matrix;
use crate::pool;
use crate::Result;

/// Tag byte of a nil tensor.
pub const TAG_NIL: u8 = 0x00;

const DIMS_U32: u8 = 0x10;
const DIMS_U64: u8 = 0x20;

/// Configurable tensor writer.
///
/// The default writes four-byte dimensions, widening automatically for a
/// tensor whose row or column count does not fit in a `u32`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Encoder {
    wide: bool,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always write eight-byte dimensions.
    pub fn wide(mut self) -> Self {
        self.wide = true;
        self
    }

    /// Write one tensor (or a view) to `w`.
    pub fn encode<T: Element, W: Write>(&self, w: &mut W, tensor: &impl Matrix<T>) -> Result<()> {
        w.write_all(&self.to_bytes(tensor))?;
        Ok(())
    }

    /// Write the nil marker to `w`.
    pub fn encode_nil<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&[TAG_NIL])?;
        Ok(())
    }

    /// Encode one tensor (or a view) into a new buffer.
    pub fn to_bytes<T: Element>(&self, tensor: &impl Matrix<T>) -> Vec<u8> {
        let (rows, cols) = (tensor.rows(), tensor.cols());
        let wide = self.wide || u32::try_from(rows).is_err() || u32::try_from(cols).is_err();
        let dim_bytes = if wide { 8 } else { 4 };
        let payload = T::DTYPE.element_size() * tensor.size();

        let mut buf = Vec::with_capacity(1 + 2 * dim_bytes + payload);
        let generation = if wide { DIMS_U64 } else { DIMS_U32 };
        buf.push(generation | T::DTYPE.tag());
        if wide {
            buf.extend_from_slice(&(rows as u64).to_le_bytes());
            buf.extend_from_slice(&(cols as u64).to_le_bytes());
        } else {
            buf.extend_from_slice(&(rows as u32).to_le_bytes());
            buf.extend_from_slice(&(cols as u32).to_le_bytes());
        }
        if cfg!(target_endian = "little") {
            buf.extend_from_slice(bytemuck::cast_slice(tensor.data()));
        } else {
            for &v in tensor.data() {
                v.write_le(&mut buf);
            }
        }

        tracing::debug!(rows, cols, dtype = %T::DTYPE, wide, bytes = buf.len(), "encoded tensor");
        buf
    }
}

/// Write `tensor` to `w`, or the nil marker for `None`.
pub fn encode<T: Element, W: Write>(w: &mut W, tensor: Option<&Dense<T>>) -> Result<()> {
    let encoder = Encoder::new();
    match tensor {
        Some(t) => encoder.encode(w, t),
        None => encoder.encode_nil(w),
    }
}

/// Read one tensor from `r`. Returns `Ok(None)` for the nil marker.
///
/// The tag and element type are validated before any element is read, and
/// the payload is read incrementally, so a corrupt header cannot trigger a
/// huge allocation.
pub fn decode<T: Element, R: Read>(r: &mut R) -> Result<Option<Dense<T>>> {
    let mut tag = [0u8; 1];
    read_exact(r, &mut tag, "tag")?;
    let tag = tag[0];
    if tag == TAG_NIL {
        return Ok(None);
    }

    let wide = match tag & 0xF0 {
        DIMS_U32 => false,
        DIMS_U64 => true,
        _ => return Err(reject(DensorError::UnknownTag(tag))),
    };
    let dtype = DType::from_tag(tag & 0x0F).ok_or_else(|| reject(DensorError::UnknownTag(tag)))?;
    if dtype != T::DTYPE {
        return Err(reject(DensorError::DTypeMismatch {
            expected: T::DTYPE,
            got: dtype,
        }));
    }

    let (rows, cols) = if wide {
        (read_u64(r, "rows")?, read_u64(r, "cols")?)
    } else {
        (u64::from(read_u32(r, "rows")?), u64::from(read_u32(r, "cols")?))
    };
    let overflow = || reject(DensorError::DimensionOverflow { rows, cols });
    let r_us = usize::try_from(rows).map_err(|_| overflow())?;
    let c_us = usize::try_from(cols).map_err(|_| overflow())?;
    let size = r_us.checked_mul(c_us).ok_or_else(overflow)?;
    let expected = dtype.storage_bytes(size).ok_or_else(overflow)?;

    let mut payload = Vec::new();
    r.by_ref().take(expected as u64).read_to_end(&mut payload)?;
    if payload.len() != expected {
        return Err(reject(DensorError::PayloadLength {
            expected,
            got: payload.len(),
        }));
    }

    let mut t = pool::global::<T>().get(r_us, c_us);
    for (v, bytes) in t
        .data_mut()
        .iter_mut()
        .zip(payload.chunks_exact(dtype.element_size()))
    {
        *v = T::read_le(bytes);
    }
    tracing::debug!(rows, cols, dtype = %dtype, wide, "decoded tensor");
    Ok(Some(t))
}

/// Encode `tensor` into a new buffer with four-byte dimensions.
pub fn to_bytes<T: Element>(tensor: &Dense<T>) -> Vec<u8> {
    Encoder::new().to_bytes(tensor)
}

/// Decode exactly one dense tensor from `bytes`.
///
/// Fails with [`DensorError::NilTensor`] on a nil marker and with
/// [`DensorError::PayloadLength`] if bytes remain after the tensor.
pub fn from_bytes<T: Element>(bytes: &[u8]) -> Result<Dense<T>> {
    let mut rest = bytes;
    let t = decode::<T, _>(&mut rest)?.ok_or(DensorError::NilTensor)?;
    if !rest.is_empty() {
        return Err(reject(DensorError::PayloadLength {
            expected: bytes.len() - rest.len(),
            got: bytes.len(),
        }));
    }
    Ok(t)
}

impl<T: Element> Dense<T> {
    /// Binary encoding of `self`; see [`codec`](crate::codec).
    pub fn marshal_binary(&self) -> Vec<u8> {
        to_bytes(self)
    }

    /// Decode a tensor produced by [`marshal_binary`](Dense::marshal_binary).
    pub fn unmarshal_binary(bytes: &[u8]) -> Result<Dense<T>> {
        from_bytes(bytes)
    }
}

fn read_exact<R: Read>(r: &mut R, buf: &mut [u8], what: &'static str) -> Result<()> {
    r.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => reject(DensorError::Truncated { what }),
        _ => DensorError::Io(e),
    })
}

fn read_u32<R: Read>(r: &mut R, what: &'static str) -> Result<u32> {
    let mut b = [0u8; 4];
    read_exact(r, &mut b, what)?;
    Ok(u32::from_le_bytes(b))
}

fn read_u64<R: Read>(r: &mut R, what: &'static str) -> Result<u64> {
    let mut b = [0u8; 8];
    read_exact(r, &mut b, what)?;
    Ok(u64::from_le_bytes(b))
}

fn reject(err: DensorError) -> DensorError {
    tracing::debug!(error = %err, "rejected tensor payload");
    err
}

#[cfg(feature = "serde")]
mod serde_impl {
    use serde::de::Error as _;
    use serde::ser::SerializeStruct;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::dense::Dense;
    use crate::element::Element;

    impl<T: Element + Serialize> Serialize for Dense<T> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut s = serializer.serialize_struct("Dense", 3)?;
            s.serialize_field("rows", &self.rows())?;
            s.serialize_field("cols", &self.cols())?;
            s.serialize_field("data", self.data())?;
            s.end()
        }
    }

    #[derive(Deserialize)]
    #[serde(rename = "Dense")]
    struct Raw<T> {
        rows: usize,
        cols: usize,
        data: Vec<T>,
    }

    impl<'de, T: Element + Deserialize<'de>> Deserialize<'de> for Dense<T> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let raw = Raw::<T>::deserialize(deserializer)?;
            Dense::try_from_vec(raw.rows, raw.cols, raw.data).map_err(D::Error::custom)
        }
    }

}
