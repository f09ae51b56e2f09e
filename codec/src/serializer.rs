//! Bidirectional serializer façade.
//!
//! A [`Serializer`] wraps one [`BitStream`] in a fixed [`Mode`]. Every
//! operation takes a mutable slot: when writing it reads the slot and appends
//! to the stream, when reading it decodes from the stream and assigns the
//! slot. A type therefore describes its layout once:
//!
//! ```
//! use bitstream::BitStream;
//! use codec::{CodecResult, Serializable, Serializer};
//!
//! #[derive(Default)]
//! struct Player {
//!     alive: bool,
//!     health: i32,
//!     name: Option<String>,
//! }
//!
//! impl Serializable for Player {
//!     fn serialize(&mut self, s: &mut Serializer<'_>) -> CodecResult<()> {
//!         s.value(&mut self.alive, true)?;
//!         s.value(&mut self.health, true)?;
//!         s.string(&mut self.name, true)
//!     }
//! }
//!
//! let mut player = Player { alive: true, health: -3, name: Some("ann".into()) };
//! let mut stream = BitStream::new();
//! player.serialize(&mut Serializer::writer(&mut stream)).unwrap();
//!
//! let mut stream = BitStream::from_vec(stream.into_vec());
//! let mut decoded = Player::default();
//! decoded.serialize(&mut Serializer::reader(&mut stream)).unwrap();
//! assert_eq!(decoded.health, -3);
//! assert_eq!(decoded.name.as_deref(), Some("ann"));
//! ```
//!
//! No schema travels on the wire: both ends must issue the same calls, in the
//! same order, with the same packed flags.
//!
//! # Arrays
//!
//! Arrays are prefixed with an `i32` length in the packed (zig-zag varint) or
//! unpacked (little-endian) encoding. `-1` marks a null array, which is
//! distinct from an empty one. Before allocating, a reader checks the length
//! against the configured [`CodecLimits`] and against the bits left in the
//! stream. On error the slot is left as `None`.

use bitstream::BitStream;

use crate::enums::{self, EnumRepr};
use crate::error::{CodecError, CodecResult, LimitKind};
use crate::field::{check_remaining, Field};
use crate::limits::CodecLimits;

/// Array length that marks a null array.
pub const NULL_LENGTH: i32 = -1;

/// Direction of a [`Serializer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Reading,
    Writing,
}

/// A type that describes its own layout through a [`Serializer`].
pub trait Serializable {
    /// Reads or writes every field of `self`, depending on the serializer's
    /// mode.
    fn serialize(&mut self, serializer: &mut Serializer<'_>) -> CodecResult<()>;
}

/// Symmetric reader/writer over a single [`BitStream`].
#[derive(Debug)]
pub struct Serializer<'a> {
    stream: &'a mut BitStream,
    mode: Mode,
    limits: CodecLimits,
}

impl<'a> Serializer<'a> {
    pub fn new(stream: &'a mut BitStream, mode: Mode) -> Self {
        Self {
            stream,
            mode,
            limits: CodecLimits::default(),
        }
    }

    /// Creates a serializer that decodes from `stream`.
    pub fn reader(stream: &'a mut BitStream) -> Self {
        Self::new(stream, Mode::Reading)
    }

    /// Creates a serializer that appends to `stream`.
    pub fn writer(stream: &'a mut BitStream) -> Self {
        Self::new(stream, Mode::Writing)
    }

    /// Replaces the decoding limits.
    #[must_use]
    pub fn with_limits(mut self, limits: CodecLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub const fn is_reading(&self) -> bool {
        matches!(self.mode, Mode::Reading)
    }

    #[must_use]
    pub const fn is_writing(&self) -> bool {
        matches!(self.mode, Mode::Writing)
    }

    #[must_use]
    pub const fn limits(&self) -> &CodecLimits {
        &self.limits
    }

    #[must_use]
    pub fn stream(&self) -> &BitStream {
        &*self.stream
    }

    /// Direct access to the stream, for fields with a hand-written layout.
    pub fn stream_mut(&mut self) -> &mut BitStream {
        &mut *self.stream
    }

    /// Scalar, string, or fixed composite record.
    pub fn value<T: Field>(&mut self, slot: &mut T, packed: bool) -> CodecResult<()> {
        match self.mode {
            Mode::Writing => slot.encode(self.stream, packed),
            Mode::Reading => {
                *slot = T::decode(self.stream, packed, &self.limits)?;
                Ok(())
            }
        }
    }

    /// Presence bit followed by the value when present.
    pub fn nullable<T: Field>(&mut self, slot: &mut Option<T>, packed: bool) -> CodecResult<()> {
        self.value(slot, packed)
    }

    /// Presence bit, then the length prefix and UTF-8 bytes.
    pub fn string(&mut self, slot: &mut Option<String>, packed: bool) -> CodecResult<()> {
        self.value(slot, packed)
    }

    /// Length-prefixed array. Reading reuses the slot's allocation.
    pub fn array<T: Field>(&mut self, slot: &mut Option<Vec<T>>, packed: bool) -> CodecResult<()> {
        self.sequence(
            slot,
            packed,
            T::MIN_BITS,
            |item, stream, packed| item.encode(stream, packed),
            |stream, packed, limits| T::decode(stream, packed, limits),
        )
    }

    /// Byte array with the same framing as `array::<u8>`, copied in bulk.
    pub fn bytes(&mut self, slot: &mut Option<Vec<u8>>, packed: bool) -> CodecResult<()> {
        match self.mode {
            Mode::Writing => {
                match slot {
                    Some(bytes) => {
                        write_length(self.stream, array_length(bytes.len())?, packed)?;
                        self.stream.write_bytes(bytes);
                    }
                    None => write_length(self.stream, NULL_LENGTH, packed)?,
                }
                Ok(())
            }
            Mode::Reading => {
                let mut bytes = slot.take().unwrap_or_default();
                let Some(len) = read_length(self.stream, packed, 8, &self.limits)? else {
                    return Ok(());
                };
                bytes.clear();
                bytes.resize(len, 0);
                self.stream.read_bytes(&mut bytes)?;
                *slot = Some(bytes);
                Ok(())
            }
        }
    }

    /// Enumeration encoded by its representation width.
    pub fn enumeration<E: EnumRepr>(&mut self, slot: &mut E, packed: bool) -> CodecResult<()> {
        match self.mode {
            Mode::Writing => enums::encode(slot, self.stream, packed),
            Mode::Reading => {
                *slot = enums::decode(self.stream, packed)?;
                Ok(())
            }
        }
    }

    /// Presence bit followed by the enumeration when present.
    pub fn nullable_enumeration<E: EnumRepr>(
        &mut self,
        slot: &mut Option<E>,
        packed: bool,
    ) -> CodecResult<()> {
        match self.mode {
            Mode::Writing => {
                self.stream.write_bit(slot.is_some());
                match slot {
                    Some(value) => enums::encode(value, self.stream, packed),
                    None => Ok(()),
                }
            }
            Mode::Reading => {
                *slot = if self.stream.read_bit()? {
                    Some(enums::decode(self.stream, packed)?)
                } else {
                    None
                };
                Ok(())
            }
        }
    }

    /// Length-prefixed array of enumerations.
    pub fn enumeration_array<E: EnumRepr>(
        &mut self,
        slot: &mut Option<Vec<E>>,
        packed: bool,
    ) -> CodecResult<()> {
        self.sequence(
            slot,
            packed,
            enums::min_bits::<E>(),
            |item, stream, packed| enums::encode(item, stream, packed),
            |stream, packed, _| enums::decode(stream, packed),
        )
    }

    /// Length-prefixed array of enumerations, each behind a presence bit.
    pub fn nullable_enumeration_array<E: EnumRepr>(
        &mut self,
        slot: &mut Option<Vec<Option<E>>>,
        packed: bool,
    ) -> CodecResult<()> {
        self.sequence(
            slot,
            packed,
            1,
            |item, stream, packed| {
                stream.write_bit(item.is_some());
                match item {
                    Some(value) => enums::encode(value, stream, packed),
                    None => Ok(()),
                }
            },
            |stream, packed, _| {
                if stream.read_bit()? {
                    enums::decode(stream, packed).map(Some)
                } else {
                    Ok(None)
                }
            },
        )
    }

    /// Nested object with its own layout.
    pub fn object<S: Serializable + ?Sized>(&mut self, slot: &mut S) -> CodecResult<()> {
        slot.serialize(self)
    }

    fn sequence<T>(
        &mut self,
        slot: &mut Option<Vec<T>>,
        packed: bool,
        min_bits: usize,
        mut encode: impl FnMut(&T, &mut BitStream, bool) -> CodecResult<()>,
        mut decode: impl FnMut(&mut BitStream, bool, &CodecLimits) -> CodecResult<T>,
    ) -> CodecResult<()> {
        match self.mode {
            Mode::Writing => {
                let Some(items) = slot else {
                    return write_length(self.stream, NULL_LENGTH, packed);
                };
                write_length(self.stream, array_length(items.len())?, packed)?;
                for item in items.iter() {
                    encode(item, self.stream, packed)?;
                }
                Ok(())
            }
            Mode::Reading => {
                let mut items = slot.take().unwrap_or_default();
                let Some(len) = read_length(self.stream, packed, min_bits, &self.limits)? else {
                    return Ok(());
                };
                items.clear();
                items.reserve(len);
                for _ in 0..len {
                    items.push(decode(self.stream, packed, &self.limits)?);
                }
                *slot = Some(items);
                Ok(())
            }
        }
    }
}

fn array_length(len: usize) -> CodecResult<i32> {
    i32::try_from(len).map_err(|_| CodecError::LengthOverflow { length: len })
}

fn write_length(stream: &mut BitStream, len: i32, packed: bool) -> CodecResult<()> {
    len.encode(stream, packed)
}

/// Reads an array length, returning `None` for a null array.
///
/// A declared length can never need more than `min_bits` per element beyond
/// the bits left in the stream. Elements that encode to nothing are bounded
/// only by the array length limit.
fn read_length(
    stream: &mut BitStream,
    packed: bool,
    min_bits: usize,
    limits: &CodecLimits,
) -> CodecResult<Option<usize>> {
    let raw = i32::decode(stream, packed, limits)?;
    if raw == NULL_LENGTH {
        return Ok(None);
    }
    let len = usize::try_from(raw).map_err(|_| CodecError::InvalidLength {
        length: i64::from(raw),
    })?;
    if len > limits.max_array_len {
        return Err(CodecError::LimitsExceeded {
            kind: LimitKind::ArrayLength,
            limit: limits.max_array_len,
            actual: len,
        });
    }
    check_remaining(stream, len, min_bits)?;
    Ok(Some(len))
}
