//! Bidirectional field serializer for the syncodec state codec.
//!
//! This crate turns typed values into a dense bit stream and back. A type
//! describes its layout once, through a [`Serializer`] that is either reading
//! or writing; every field is encoded with a per-call `packed` flag choosing
//! between a fixed-width and a variable-length or quantized encoding.
//!
//! # Features
//!
//! - Varint and zig-zag integers, quantized floats with a bit-exact escape
//! - Presence bits for optional values, `-1` length sentinel for null arrays
//! - Vector, color, ray and smallest-three quaternion records
//! - Enumerations encoded by their representation width
//! - Replacement deltas for scalars, enumerations and nested objects
//! - One-shot `dump`/`load` helpers and a streaming fill helper
//!
//! # Design Principles
//!
//! - **Symmetric** - The same call sequence reads and writes a value.
//! - **No schema on the wire** - Both ends agree on layout and packed flags.
//! - **Bounded decoding** - Declared lengths are checked before allocating.
//! - **Explicit errors** - Framing errors are distinct from value errors.

mod buffer;
mod delta;
mod enums;
mod error;
mod field;
mod fill;
mod limits;
mod serializer;

pub mod float;
pub mod records;
pub mod varint;

pub use buffer::{debug_bytes, dump, dump_pooled, dump_to_vec, load, load_with_limits};
pub use delta::{Delta, Replace, ReplaceEnum, ReplaceObject};
pub use enums::{Discriminant, EnumRepr};
pub use error::{CodecError, CodecResult, LimitKind};
pub use field::Field;
pub use fill::{read_until, read_until_with, FillControl, FillError};
pub use limits::CodecLimits;
pub use records::{Color, Color32, Quaternion, Ray, Ray2D, Vector2, Vector3, Vector4};
pub use serializer::{Mode, Serializable, Serializer, NULL_LENGTH};

#[cfg(test)]
mod tests {
    use bitstream::BitStream;

    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = CodecLimits::default();
        let _: CodecResult<()> = Ok(());
        let _ = Quaternion::IDENTITY;
        let _ = FillControl::new();
        assert_eq!(NULL_LENGTH, -1);
    }

    #[test]
    fn serializer_over_recycled_stream() {
        let mut stream = BitStream::new();
        let mut value = 12_345u32;
        Serializer::writer(&mut stream).value(&mut value, true).unwrap();
        let first = stream.as_slice().to_vec();

        stream.reset();
        Serializer::writer(&mut stream).value(&mut value, true).unwrap();
        assert_eq!(stream.as_slice(), first.as_slice());
    }
}
