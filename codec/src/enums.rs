//! Enumerations encoded by their declared representation width.
//!
//! An enum implements [`EnumRepr`], naming its `#[repr]` integer type as
//! [`EnumRepr::Repr`]. The width of that type picks the wire encoding:
//!
//! - 1 byte: one raw byte (the packed flag is ignored).
//! - 2, 4, 8 bytes: `i16`, `i32` or `i64` in the packed or unpacked encoding.
//! - anything else: nothing is written and decoding yields `E::default()`.
//!   Such enums cannot round-trip a non-default value.
//!
//! ```
//! use codec::EnumRepr;
//!
//! #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
//! #[repr(u8)]
//! enum Team {
//!     #[default]
//!     Red = 0,
//!     Blue = 1,
//! }
//!
//! impl EnumRepr for Team {
//!     type Repr = u8;
//!
//!     fn to_repr(&self) -> u8 {
//!         *self as u8
//!     }
//!
//!     fn from_repr(repr: u8) -> Option<Self> {
//!         match repr {
//!             0 => Some(Self::Red),
//!             1 => Some(Self::Blue),
//!             _ => None,
//!         }
//!     }
//! }
//! ```

use bitstream::BitStream;

use crate::error::{CodecError, CodecResult};
use crate::field::Field;
use crate::limits::CodecLimits;

/// An integer type usable as an enum representation.
pub trait Discriminant: Copy {
    /// Size of the type in bytes.
    const WIDTH: usize;

    /// Converts to the wire value, sign-extending or wrapping as needed.
    fn to_wire(self) -> i64;

    /// Converts back from the wire value, truncating to the type's width.
    fn from_wire(value: i64) -> Self;
}

macro_rules! impl_discriminant {
    ($($ty:ty),*) => {$(
        impl Discriminant for $ty {
            const WIDTH: usize = std::mem::size_of::<$ty>();

            #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
            fn to_wire(self) -> i64 {
                self as i64
            }

            #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            fn from_wire(value: i64) -> Self {
                value as $ty
            }
        }
    )*};
}

impl_discriminant!(i8, u8, i16, u16, i32, u32, i64, u64, i128, u128);

/// An enumeration with an integer representation.
pub trait EnumRepr: Sized + Default {
    /// The enum's declared representation type.
    type Repr: Discriminant;

    /// Returns the discriminant of `self`.
    fn to_repr(&self) -> Self::Repr;

    /// Returns the variant for `repr`, or `None` if no variant has it.
    fn from_repr(repr: Self::Repr) -> Option<Self>;
}

/// Fewest bits an encoding of `E` occupies.
pub(crate) const fn min_bits<E: EnumRepr>() -> usize {
    match E::Repr::WIDTH {
        1 | 2 | 4 | 8 => 8,
        _ => 0,
    }
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn encode<E: EnumRepr>(value: &E, stream: &mut BitStream, packed: bool) -> CodecResult<()> {
    let wire = value.to_repr().to_wire();
    match E::Repr::WIDTH {
        1 => stream.write_byte(wire as u8),
        2 => (wire as i16).encode(stream, packed)?,
        4 => (wire as i32).encode(stream, packed)?,
        8 => wire.encode(stream, packed)?,
        _ => {}
    }
    Ok(())
}

pub(crate) fn decode<E: EnumRepr>(stream: &mut BitStream, packed: bool) -> CodecResult<E> {
    let limits = CodecLimits::default();
    let wire = match E::Repr::WIDTH {
        1 => i64::from(stream.read_byte()?),
        2 => i64::from(i16::decode(stream, packed, &limits)?),
        4 => i64::from(i32::decode(stream, packed, &limits)?),
        8 => i64::decode(stream, packed, &limits)?,
        _ => return Ok(E::default()),
    };
    E::from_repr(E::Repr::from_wire(wire)).ok_or(CodecError::InvalidEnum { value: wire })
}
