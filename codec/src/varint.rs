//! Variable-length integer encoding ("packed" integers).
//!
//! Unsigned values are emitted 7 bits at a time, low-order group first, with
//! the continuation bit (0x80) set on every byte except the last. Signed values
//! are zig-zag mapped first so small negative numbers stay short.
//!
//! Worst-case sizes: 3 bytes for 16-bit, 5 bytes for 32-bit and 10 bytes for
//! 64-bit values.

use bitstream::BitStream;

use crate::error::{CodecError, CodecResult};

const DATA_BITS: u32 = 7;
const DATA_MASK: u8 = 0x7F;
const CONTINUATION: u8 = 0x80;

/// Maps a signed value to unsigned so that small magnitudes stay small.
///
/// The mapping is `(v << 1) ^ (v >> 63)`; for values that fit a narrower
/// signed type it equals that type's own zig-zag mapping.
#[must_use]
pub const fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Reverses [`zigzag_encode`].
#[must_use]
pub const fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Returns the number of bytes [`write_varuint`] emits for `value`.
#[must_use]
pub const fn varuint_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    if bits == 0 {
        1
    } else {
        bits.div_ceil(DATA_BITS as usize)
    }
}

/// Returns the maximum encoded length for a `width`-bit integer.
#[must_use]
pub const fn max_varuint_len(width: u8) -> usize {
    (width as usize).div_ceil(DATA_BITS as usize)
}

/// Writes an unsigned varint.
pub fn write_varuint(stream: &mut BitStream, mut value: u64) {
    while value > u64::from(DATA_MASK) {
        stream.write_byte((value as u8 & DATA_MASK) | CONTINUATION);
        value >>= DATA_BITS;
    }
    stream.write_byte(value as u8);
}

/// Reads an unsigned varint that must fit in `width` bits.
pub fn read_varuint(stream: &mut BitStream, width: u8) -> CodecResult<u64> {
    let mut result = 0u128;
    for index in 0..max_varuint_len(width) {
        let byte = stream.read_byte()?;
        result |= u128::from(byte & DATA_MASK) << (index as u32 * DATA_BITS);
        if byte & CONTINUATION == 0 {
            if result >> width != 0 {
                return Err(CodecError::InvalidVarint { width });
            }
            return Ok(result as u64);
        }
    }
    Err(CodecError::InvalidVarint { width })
}

/// Writes a zig-zag mapped signed varint.
pub fn write_varint(stream: &mut BitStream, value: i64) {
    write_varuint(stream, zigzag_encode(value));
}

/// Reads a zig-zag mapped signed varint that must fit in `width` bits.
pub fn read_varint(stream: &mut BitStream, width: u8) -> CodecResult<i64> {
    read_varuint(stream, width).map(zigzag_decode)
}
