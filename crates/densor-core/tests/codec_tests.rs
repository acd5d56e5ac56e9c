//! Integration tests for the binary codec.

use std::io::Cursor;

use densor_core::codec::{self, Encoder};
use densor_core::prelude::*;

fn bits(t: &Dense<f64>) -> Vec<u64> {
    t.data().iter().map(|v| v.to_bits()).collect()
}

fn roundtrip<T: Element>(t: &Dense<T>) -> Dense<T> {
    Dense::unmarshal_binary(&t.marshal_binary()).expect("round trip failed")
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_roundtrip_representative_shapes() {
    let shapes = [(0, 0), (0, 1), (1, 0), (1, 1), (2, 3)];
    let values = [0.0f64, -0.0, -3.5, 1e300, f64::NAN, f64::INFINITY, f64::NEG_INFINITY];
    for (rows, cols) in shapes {
        let t = Dense::<f64>::from_fn(rows, cols, |r, c| values[(r * cols + c) % values.len()]);
        let back = roundtrip(&t);
        assert_eq!(back.rows(), rows);
        assert_eq!(back.cols(), cols);
        assert_eq!(bits(&back), bits(&t), "{rows}x{cols}");
    }
}

#[test]
fn test_roundtrip_f32_non_finite() {
    let t = Dense::new(2, 3, &[0.0f32, -1.25, f32::NAN, f32::INFINITY, f32::NEG_INFINITY, f32::MIN_POSITIVE]);
    let back = roundtrip(&t);
    assert_eq!(back.shape(), t.shape());
    let raw = |d: &Dense<f32>| d.data().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
    assert_eq!(raw(&back), raw(&t));
}

#[test]
fn test_wide_roundtrip_through_reader() {
    let t = Dense::new(2, 2, &[1.0f64, 2.0, 3.0, 4.0]);
    let mut buf = Vec::new();
    Encoder::new().wide().encode(&mut buf, &t).unwrap();
    assert_eq!(buf.len(), 1 + 16 + 32);

    let mut cursor = Cursor::new(buf);
    let back = codec::decode::<f64, _>(&mut cursor).unwrap().unwrap();
    assert_eq!(back, t);
}

#[test]
fn test_sequence_with_nil_markers() {
    let a = Dense::new(1, 1, &[1.0f32]);
    let b = Dense::new(1, 2, &[2.0f32, 3.0]);
    let mut buf = Vec::new();
    for t in [Some(&a), None, Some(&b), None] {
        codec::encode(&mut buf, t).unwrap();
    }

    let mut cursor = Cursor::new(buf);
    let decoded: Vec<Option<Dense<f32>>> =
        (0..4).map(|_| codec::decode(&mut cursor).unwrap()).collect();
    assert_eq!(decoded[0].as_ref(), Some(&a));
    assert!(decoded[1].is_none());
    assert_eq!(decoded[2].as_ref(), Some(&b));
    assert!(decoded[3].is_none());
}

// ============================================================================
// Rejection
// ============================================================================

#[test]
fn test_rejects_wrong_length() {
    let bytes = codec::to_bytes(&Dense::new(2, 2, &[1.0f64; 4]));
    for cut in [1, 8, bytes.len() - 1] {
        let err = codec::from_bytes::<f64>(&bytes[..cut]).unwrap_err();
        assert!(err.is_data_error(), "cut at {cut}: {err}");
    }
    let mut extended = bytes.clone();
    extended.extend_from_slice(&[0u8; 8]);
    assert!(matches!(
        codec::from_bytes::<f64>(&extended),
        Err(DensorError::PayloadLength { .. })
    ));
}

#[test]
fn test_rejects_dtype_before_payload() {
    // An f32 header with no payload at all still reports the dtype, not the length.
    let header = [0x11u8, 1, 0, 0, 0, 1, 0, 0, 0];
    let err = codec::from_bytes::<f64>(&header).unwrap_err();
    assert!(matches!(err, DensorError::DTypeMismatch { .. }));
}

#[test]
fn test_huge_declared_size_does_not_allocate() {
    let mut bytes = vec![0x12u8];
    bytes.extend_from_slice(&u32::MAX.to_le_bytes());
    bytes.extend_from_slice(&u32::MAX.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 16]);
    let err = codec::from_bytes::<f64>(&bytes).unwrap_err();
    assert!(err.is_data_error());
}
