//! Quantized ("packed") floating-point encodings.
//!
//! A packed float is stored as fixed point: `q = round(v * 2^F)` where `F` is
//! the number of fractional bits. Inside the envelope `|q| <= MAX_Q` the value
//! is written as the unsigned varint `zigzag(q) + 1`. The varint `0` is the
//! escape sentinel: it is followed by the raw IEEE-754 bit pattern, which
//! covers out-of-envelope magnitudes, NaN and the infinities bit-exactly.
//!
//! Scaling by a power of two is exact, so the only error is the rounding of
//! `q`: at most half a step. Negative zero decodes as positive zero.
//!
//! | type  | `F` | step   | max error | envelope (`MAX_Q`)  | max magnitude |
//! |-------|-----|--------|-----------|---------------------|---------------|
//! | `f32` | 10  | 2^-10  | 2^-11     | 2^24 - 1            | ~16384        |
//! | `f64` | 20  | 2^-20  | 2^-21     | 2^52 - 1            | ~2^32         |
//!
//! In-envelope sizes are 1-4 bytes for `f32` and 1-8 bytes for `f64`; the
//! escape path costs 5 and 9 bytes.
//!
//! The unpacked path writes the raw bit pattern, little-endian, and is always
//! bit-exact.

use bitstream::BitStream;

use crate::error::CodecResult;
use crate::varint::{read_varuint, write_varuint, zigzag_decode, zigzag_encode};

const ESCAPE: u64 = 0;

const F32_SCALE: f32 = 1024.0;
const F32_MAX_Q: i32 = (1 << 24) - 1;

const F64_SCALE: f64 = 1_048_576.0;
const F64_MAX_Q: i64 = (1 << 52) - 1;

/// Quantization step of the packed `f32` encoding.
pub const F32_PACKED_STEP: f32 = 1.0 / F32_SCALE;
/// Largest round-trip error of an in-envelope packed `f32`.
pub const F32_PACKED_TOLERANCE: f32 = F32_PACKED_STEP / 2.0;
/// Largest magnitude that takes the quantized path for `f32`.
pub const F32_PACKED_MAX: f32 = F32_MAX_Q as f32 / F32_SCALE;

/// Quantization step of the packed `f64` encoding.
pub const F64_PACKED_STEP: f64 = 1.0 / F64_SCALE;
/// Largest round-trip error of an in-envelope packed `f64`.
pub const F64_PACKED_TOLERANCE: f64 = F64_PACKED_STEP / 2.0;
/// Largest magnitude that takes the quantized path for `f64`.
pub const F64_PACKED_MAX: f64 = F64_MAX_Q as f64 / F64_SCALE;

/// Returns the fixed-point value for `value`, or `None` outside the envelope.
#[must_use]
pub fn quantize_f32(value: f32) -> Option<i32> {
    let scaled = value * F32_SCALE;
    if scaled.is_finite() && scaled.abs() <= F32_MAX_Q as f32 {
        Some(scaled.round() as i32)
    } else {
        None
    }
}

/// Returns the fixed-point value for `value`, or `None` outside the envelope.
#[must_use]
pub fn quantize_f64(value: f64) -> Option<i64> {
    let scaled = value * F64_SCALE;
    if scaled.is_finite() && scaled.abs() <= F64_MAX_Q as f64 {
        Some(scaled.round() as i64)
    } else {
        None
    }
}

/// Writes a packed `f32`.
pub fn write_f32_packed(stream: &mut BitStream, value: f32) {
    match quantize_f32(value) {
        Some(q) => write_varuint(stream, zigzag_encode(i64::from(q)) + 1),
        None => {
            write_varuint(stream, ESCAPE);
            stream.write_bytes(&value.to_bits().to_le_bytes());
        }
    }
}

/// Reads a packed `f32`.
pub fn read_f32_packed(stream: &mut BitStream) -> CodecResult<f32> {
    let code = read_varuint(stream, 32)?;
    if code == ESCAPE {
        return read_f32_raw(stream);
    }
    let q = zigzag_decode(code - 1);
    Ok(q as f32 / F32_SCALE)
}

/// Writes a packed `f64`.
pub fn write_f64_packed(stream: &mut BitStream, value: f64) {
    match quantize_f64(value) {
        Some(q) => write_varuint(stream, zigzag_encode(q) + 1),
        None => {
            write_varuint(stream, ESCAPE);
            stream.write_bytes(&value.to_bits().to_le_bytes());
        }
    }
}

/// Reads a packed `f64`.
pub fn read_f64_packed(stream: &mut BitStream) -> CodecResult<f64> {
    let code = read_varuint(stream, 64)?;
    if code == ESCAPE {
        return read_f64_raw(stream);
    }
    let q = zigzag_decode(code - 1);
    Ok(q as f64 / F64_SCALE)
}

/// Reads a raw little-endian `f32` bit pattern.
pub fn read_f32_raw(stream: &mut BitStream) -> CodecResult<f32> {
    let mut bytes = [0u8; 4];
    stream.read_bytes(&mut bytes)?;
    Ok(f32::from_bits(u32::from_le_bytes(bytes)))
}

/// Reads a raw little-endian `f64` bit pattern.
pub fn read_f64_raw(stream: &mut BitStream) -> CodecResult<f64> {
    let mut bytes = [0u8; 8];
    stream.read_bytes(&mut bytes)?;
    Ok(f64::from_bits(u64::from_le_bytes(bytes)))
}
