//! Growable bit stream used for both encoding and decoding.

use crate::error::{BitError, BitResult};

/// Smallest allocation made when a stream has to grow.
const MIN_GROWTH: usize = 16;

/// An expandable byte buffer with a bit-granular cursor.
///
/// The same type serves the writing side (bytes are appended and the buffer
/// grows on demand) and the reading side (wrapping a received byte array).
/// Bits are packed least-significant-bit first, so a value whose bit count is
/// a multiple of 8 written at a byte boundary lands as whole little-endian
/// bytes.
///
/// The stream tracks three quantities:
///
/// - **capacity**: bytes of zeroed storage currently allocated,
/// - **length**: logical size in bytes, i.e. how far writes have reached,
/// - **cursor**: the bit offset where the next read or write happens.
///
/// Reads never go past the length. Writes past the length extend it, zeroing
/// the newly covered bytes first so a recycled buffer never leaks old bits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitStream {
    buf: Vec<u8>,
    len: usize,
    bit_pos: usize,
}

impl BitStream {
    /// Creates an empty stream with no allocated storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty stream with `bytes` of pre-allocated storage.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buf: vec![0; bytes],
            len: 0,
            bit_pos: 0,
        }
    }

    /// Wraps received bytes for reading. The length is the vector length.
    #[must_use]
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        let len = bytes.len();
        Self {
            buf: bytes,
            len,
            bit_pos: 0,
        }
    }

    /// Copies received bytes into a new stream for reading.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self::from_vec(bytes.to_vec())
    }

    /// Returns the allocated storage in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Returns the logical length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing has been written (or received).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sets the logical length.
    ///
    /// Growing zero-fills the new bytes; shrinking clamps the cursor.
    pub fn set_length(&mut self, len: usize) {
        if len > self.len {
            self.ensure_capacity(len);
            self.buf[self.len..len].fill(0);
        }
        self.len = len;
        self.bit_pos = self.bit_pos.min(len * 8);
    }

    /// Returns the byte offset of the cursor.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.bit_pos / 8
    }

    /// Moves the cursor to the start of byte `position`.
    pub fn set_position(&mut self, position: usize) -> BitResult<()> {
        if position > self.len {
            return Err(BitError::PositionOutOfRange {
                position,
                length: self.len,
            });
        }
        self.bit_pos = position * 8;
        Ok(())
    }

    /// Returns the cursor in bits from the start of the stream.
    #[must_use]
    pub const fn bit_position(&self) -> usize {
        self.bit_pos
    }

    /// Moves the cursor to an absolute bit offset.
    pub fn set_bit_position(&mut self, bit_position: usize) -> BitResult<()> {
        let length = self.len * 8;
        if bit_position > length {
            return Err(BitError::PositionOutOfRange {
                position: bit_position,
                length,
            });
        }
        self.bit_pos = bit_position;
        Ok(())
    }

    /// Returns the bit index within the current byte (0-7).
    #[must_use]
    pub const fn bit_offset(&self) -> u8 {
        (self.bit_pos % 8) as u8
    }

    /// Returns `true` if the cursor sits on a byte boundary.
    #[must_use]
    pub const fn is_aligned(&self) -> bool {
        self.bit_pos % 8 == 0
    }

    /// Returns the number of bits between the cursor and the logical end.
    #[must_use]
    pub const fn remaining_bits(&self) -> usize {
        (self.len * 8).saturating_sub(self.bit_pos)
    }

    /// Returns the number of bytes touched by the cursor so far.
    #[must_use]
    pub const fn bytes_consumed(&self) -> usize {
        self.bit_pos.div_ceil(8)
    }

    /// Rewinds to an empty stream, keeping the allocation.
    pub fn reset(&mut self) {
        self.len = 0;
        self.bit_pos = 0;
    }

    /// Returns the logical contents.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Consumes the stream and returns its logical contents.
    #[must_use]
    pub fn into_vec(mut self) -> Vec<u8> {
        self.buf.truncate(self.len);
        self.buf
    }

    /// Writes a single bit.
    pub fn write_bit(&mut self, value: bool) {
        let idx = self.bit_pos / 8;
        self.claim(idx + 1);
        let mask = 1u8 << (self.bit_pos % 8);
        if value {
            self.buf[idx] |= mask;
        } else {
            self.buf[idx] &= !mask;
        }
        self.bit_pos += 1;
    }

    /// Writes the low `bits` bits of `value`, least significant first.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidBitCount`] if `bits > 64`.
    /// Returns [`BitError::ValueOutOfRange`] if `value` doesn't fit in `bits`.
    pub fn write_bits(&mut self, value: u64, bits: u8) -> BitResult<()> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        if bits < 64 && value >> bits != 0 {
            return Err(BitError::ValueOutOfRange { value, bits });
        }
        if self.is_aligned() && bits % 8 == 0 {
            let bytes = value.to_le_bytes();
            self.write_bytes(&bytes[..usize::from(bits / 8)]);
            return Ok(());
        }
        for i in 0..bits {
            self.write_bit((value >> i) & 1 == 1);
        }
        Ok(())
    }

    /// Writes one byte, aligned or not.
    pub fn write_byte(&mut self, value: u8) {
        if self.is_aligned() {
            let idx = self.bit_pos / 8;
            self.claim(idx + 1);
            self.buf[idx] = value;
            self.bit_pos += 8;
        } else {
            for i in 0..8 {
                self.write_bit((value >> i) & 1 == 1);
            }
        }
    }

    /// Writes a run of bytes, using a bulk copy when aligned.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if self.is_aligned() {
            let start = self.bit_pos / 8;
            let end = start + bytes.len();
            self.claim(end);
            self.buf[start..end].copy_from_slice(bytes);
            self.bit_pos += bytes.len() * 8;
        } else {
            for &byte in bytes {
                self.write_byte(byte);
            }
        }
    }

    /// Writes zero bits up to the next byte boundary.
    pub fn pad_to_byte(&mut self) {
        while !self.is_aligned() {
            self.write_bit(false);
        }
    }

    /// Reads a single bit.
    pub fn read_bit(&mut self) -> BitResult<bool> {
        self.ensure_bits(1)?;
        let bit = (self.buf[self.bit_pos / 8] >> (self.bit_pos % 8)) & 1;
        self.bit_pos += 1;
        Ok(bit == 1)
    }

    /// Reads up to 64 bits, least significant first.
    pub fn read_bits(&mut self, bits: u8) -> BitResult<u64> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        self.ensure_bits(usize::from(bits))?;
        if self.is_aligned() && bits % 8 == 0 {
            let mut bytes = [0u8; 8];
            self.read_bytes(&mut bytes[..usize::from(bits / 8)])?;
            return Ok(u64::from_le_bytes(bytes));
        }
        let mut value = 0u64;
        for i in 0..bits {
            value |= u64::from(self.read_bit()?) << i;
        }
        Ok(value)
    }

    /// Reads one byte, aligned or not.
    pub fn read_byte(&mut self) -> BitResult<u8> {
        self.ensure_bits(8)?;
        if self.is_aligned() {
            let value = self.buf[self.bit_pos / 8];
            self.bit_pos += 8;
            return Ok(value);
        }
        let mut value = 0u8;
        for i in 0..8 {
            value |= u8::from(self.read_bit()?) << i;
        }
        Ok(value)
    }

    /// Fills `out` from the stream.
    ///
    /// Fails without consuming anything if fewer than `out.len()` bytes remain.
    pub fn read_bytes(&mut self, out: &mut [u8]) -> BitResult<()> {
        self.ensure_bits(out.len().saturating_mul(8))?;
        if self.is_aligned() {
            let start = self.bit_pos / 8;
            out.copy_from_slice(&self.buf[start..start + out.len()]);
            self.bit_pos += out.len() * 8;
            return Ok(());
        }
        for slot in out.iter_mut() {
            *slot = self.read_byte()?;
        }
        Ok(())
    }

    /// Skips to the next byte boundary when reading.
    pub fn align_to_byte(&mut self) -> BitResult<()> {
        let rem = self.bit_pos % 8;
        if rem == 0 {
            return Ok(());
        }
        let skip = 8 - rem;
        self.ensure_bits(skip)?;
        self.bit_pos += skip;
        Ok(())
    }

    fn ensure_bits(&self, bits: usize) -> BitResult<()> {
        let available = self.remaining_bits();
        if bits > available {
            return Err(BitError::EndOfStream {
                requested: bits,
                available,
            });
        }
        Ok(())
    }

    /// Extends the logical length to cover `end` bytes, zeroing new bytes.
    fn claim(&mut self, end: usize) {
        if end > self.len {
            self.ensure_capacity(end);
            self.buf[self.len..end].fill(0);
            self.len = end;
        }
    }

    fn ensure_capacity(&mut self, needed: usize) {
        if needed > self.buf.len() {
            let grown = needed.max(self.buf.len() * 2).max(MIN_GROWTH);
            self.buf.resize(grown, 0);
        }
    }
}

impl From<Vec<u8>> for BitStream {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_vec(bytes)
    }
}

impl AsRef<[u8]> for BitStream {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stream() {
        let stream = BitStream::new();
        assert!(stream.is_empty());
        assert_eq!(stream.capacity(), 0);
        assert_eq!(stream.position(), 0);
        assert_eq!(stream.remaining_bits(), 0);
    }

    #[test]
    fn write_single_bit_is_lsb_first() {
        let mut stream = BitStream::new();
        stream.write_bit(true);
        assert_eq!(stream.bit_position(), 1);
        assert_eq!(stream.position(), 0);
        assert_eq!(stream.as_slice(), &[0b0000_0001]);
    }

    #[test]
    fn eight_bits_advance_byte_position() {
        let mut stream = BitStream::new();
        for bit in [true, false, true, false, true, false, true, false] {
            stream.write_bit(bit);
        }
        assert_eq!(stream.position(), 1);
        assert_eq!(stream.bit_offset(), 0);
        assert_eq!(stream.as_slice(), &[0b0101_0101]);
    }

    #[test]
    fn aligned_multi_byte_value_is_little_endian() {
        let mut stream = BitStream::new();
        stream.write_bits(0xABCD, 16).unwrap();
        assert_eq!(stream.as_slice(), &[0xCD, 0xAB]);
    }

    #[test]
    fn write_bits_across_byte_boundary() {
        let mut stream = BitStream::new();
        stream.write_bits(0b1111, 4).unwrap();
        stream.write_bits(0b1010_1010, 8).unwrap();
        // 1111 in the low nibble, then 1010 1010 split across the boundary.
        assert_eq!(stream.as_slice(), &[0b1010_1111, 0b0000_1010]);
    }

    #[test]
    fn write_bits_invalid_count() {
        let mut stream = BitStream::new();
        let result = stream.write_bits(0, 65);
        assert_eq!(
            result,
            Err(BitError::InvalidBitCount {
                bits: 65,
                max_bits: 64
            })
        );
    }

    #[test]
    fn write_bits_value_out_of_range() {
        let mut stream = BitStream::new();
        let result = stream.write_bits(256, 8);
        assert_eq!(
            result,
            Err(BitError::ValueOutOfRange {
                value: 256,
                bits: 8
            })
        );
        assert!(stream.is_empty(), "failed write must not touch the stream");
    }

    #[test]
    fn unaligned_byte_roundtrip() {
        let mut stream = BitStream::new();
        stream.write_bit(true);
        stream.write_byte(0xA5);
        stream.write_bytes(&[1, 2, 3]);
        assert_eq!(stream.len(), 5);

        stream.set_position(0).unwrap();
        assert!(stream.read_bit().unwrap());
        assert_eq!(stream.read_byte().unwrap(), 0xA5);
        let mut out = [0u8; 3];
        stream.read_bytes(&mut out).unwrap();
        assert_eq!(out, [1, 2, 3]);
    }

    #[test]
    fn capacity_grows_geometrically() {
        let mut stream = BitStream::with_capacity(16);
        stream.write_bytes(&[0; 16]);
        assert_eq!(stream.capacity(), 16);
        stream.write_byte(1);
        assert_eq!(stream.capacity(), 32);
        assert_eq!(stream.len(), 17);
    }

    #[test]
    fn read_past_length_fails_without_advancing() {
        let mut stream = BitStream::from_vec(vec![0xFF]);
        stream.read_bits(4).unwrap();
        let err = stream.read_byte().unwrap_err();
        assert_eq!(
            err,
            BitError::EndOfStream {
                requested: 8,
                available: 4
            }
        );
        assert_eq!(stream.bit_position(), 4);
    }

    #[test]
    fn read_bytes_checks_whole_run_first() {
        let mut stream = BitStream::from_vec(vec![1, 2]);
        let mut out = [0u8; 3];
        assert!(stream.read_bytes(&mut out).is_err());
        assert_eq!(stream.position(), 0);
    }

    #[test]
    fn reset_keeps_allocation_and_zeroes_on_reuse() {
        let mut stream = BitStream::new();
        stream.write_bytes(&[0xFF; 4]);
        let capacity = stream.capacity();
        stream.reset();
        assert!(stream.is_empty());
        assert_eq!(stream.capacity(), capacity);

        stream.write_bit(true);
        assert_eq!(stream.as_slice(), &[0b0000_0001], "stale bits leaked");
    }

    #[test]
    fn set_length_grows_with_zeros_and_clamps_cursor() {
        let mut stream = BitStream::new();
        stream.write_bytes(&[9, 9, 9]);
        stream.set_length(1);
        assert_eq!(stream.position(), 1);
        stream.set_length(3);
        assert_eq!(stream.as_slice(), &[9, 0, 0]);
    }

    #[test]
    fn set_position_past_length_fails() {
        let mut stream = BitStream::from_vec(vec![0; 2]);
        assert_eq!(
            stream.set_position(3),
            Err(BitError::PositionOutOfRange {
                position: 3,
                length: 2
            })
        );
        assert!(stream.set_bit_position(17).is_err());
        stream.set_bit_position(9).unwrap();
        assert_eq!(stream.position(), 1);
        assert_eq!(stream.bit_offset(), 1);
    }

    #[test]
    fn overwrite_in_the_middle_preserves_neighbours() {
        let mut stream = BitStream::new();
        stream.write_bytes(&[0xFF, 0xFF]);
        stream.set_bit_position(4).unwrap();
        stream.write_bits(0, 8).unwrap();
        assert_eq!(stream.as_slice(), &[0x0F, 0xF0]);
        assert_eq!(stream.len(), 2);
    }

    #[test]
    fn pad_and_align() {
        let mut stream = BitStream::new();
        stream.write_bit(true);
        stream.pad_to_byte();
        stream.write_byte(7);
        assert_eq!(stream.as_slice(), &[1, 7]);

        stream.set_position(0).unwrap();
        stream.read_bit().unwrap();
        stream.align_to_byte().unwrap();
        assert_eq!(stream.read_byte().unwrap(), 7);
    }

    #[test]
    fn bytes_consumed_rounds_up() {
        let mut stream = BitStream::from_vec(vec![0; 2]);
        stream.read_bits(9).unwrap();
        assert_eq!(stream.bytes_consumed(), 2);
        assert_eq!(stream.position(), 1);
    }

    #[test]
    fn into_vec_truncates_to_length() {
        let mut stream = BitStream::with_capacity(64);
        stream.write_bytes(&[1, 2]);
        assert_eq!(stream.into_vec(), vec![1, 2]);
    }
}
