//! The `Field` trait: one packed and one unpacked encoding per value type.
//!
//! Every primitive width implements [`Field`] once; `Option<T>`, fixed arrays
//! and tuples compose it. The serializer façade is generic over this trait,
//! so there is a single code path per value shape instead of one overload per
//! type.
//!
//! | type                      | packed                      | unpacked            |
//! |---------------------------|-----------------------------|---------------------|
//! | `bool`                    | 1 bit                       | 1 bit               |
//! | `u8`, `i8`                | raw byte                    | raw byte            |
//! | `u16`, `u32`, `u64`       | varint                      | little-endian       |
//! | `i16`, `i32`, `i64`       | zig-zag varint              | little-endian       |
//! | `f32`, `f64`              | quantized (see `float`)     | raw bits, LE        |
//! | `char`                    | varint of the scalar value  | `u32` LE            |
//! | `String`                  | varint length + UTF-8       | `u32` LE length + UTF-8 |
//! | `Option<T>`               | presence bit + `T`          | presence bit + `T`  |
//! | `[T; N]`, tuples          | elements in order           | elements in order   |

use bitstream::BitStream;

use crate::error::{CodecError, CodecResult, LimitKind};
use crate::float::{
    read_f32_packed, read_f32_raw, read_f64_packed, read_f64_raw, write_f32_packed,
    write_f64_packed,
};
use crate::limits::CodecLimits;
use crate::varint::{read_varint, read_varuint, write_varint, write_varuint};

/// A value with a packed and an unpacked wire encoding.
///
/// The `packed` flag is not stored on the wire: reader and writer must pass
/// the same flag for the same field position.
pub trait Field: Sized {
    /// Fewest bits any encoding of this type occupies.
    ///
    /// Used to reject declared lengths that cannot fit in the remaining
    /// stream before anything is allocated.
    const MIN_BITS: usize;

    /// Appends the encoding of `self` to `stream`.
    fn encode(&self, stream: &mut BitStream, packed: bool) -> CodecResult<()>;

    /// Decodes a value from `stream`.
    fn decode(stream: &mut BitStream, packed: bool, limits: &CodecLimits) -> CodecResult<Self>;
}

/// Fails with [`CodecError::Truncated`] if `declared` elements of at least
/// `min_bits` each cannot fit in the bits left in `stream`.
pub(crate) fn check_remaining(
    stream: &BitStream,
    declared: usize,
    min_bits: usize,
) -> CodecResult<()> {
    let available_bits = stream.remaining_bits();
    if declared.saturating_mul(min_bits) > available_bits {
        return Err(CodecError::Truncated {
            declared,
            min_bits,
            available_bits,
        });
    }
    Ok(())
}

impl Field for bool {
    const MIN_BITS: usize = 1;

    fn encode(&self, stream: &mut BitStream, _packed: bool) -> CodecResult<()> {
        stream.write_bit(*self);
        Ok(())
    }

    fn decode(stream: &mut BitStream, _packed: bool, _limits: &CodecLimits) -> CodecResult<Self> {
        Ok(stream.read_bit()?)
    }
}

impl Field for u8 {
    const MIN_BITS: usize = 8;

    fn encode(&self, stream: &mut BitStream, _packed: bool) -> CodecResult<()> {
        stream.write_byte(*self);
        Ok(())
    }

    fn decode(stream: &mut BitStream, _packed: bool, _limits: &CodecLimits) -> CodecResult<Self> {
        Ok(stream.read_byte()?)
    }
}

impl Field for i8 {
    const MIN_BITS: usize = 8;

    fn encode(&self, stream: &mut BitStream, _packed: bool) -> CodecResult<()> {
        stream.write_byte(self.to_le_bytes()[0]);
        Ok(())
    }

    fn decode(stream: &mut BitStream, _packed: bool, _limits: &CodecLimits) -> CodecResult<Self> {
        Ok(Self::from_le_bytes([stream.read_byte()?]))
    }
}

macro_rules! impl_unsigned {
    ($($ty:ty => $width:literal),* $(,)?) => {$(
        impl Field for $ty {
            const MIN_BITS: usize = 8;

            fn encode(&self, stream: &mut BitStream, packed: bool) -> CodecResult<()> {
                if packed {
                    write_varuint(stream, u64::from(*self));
                } else {
                    stream.write_bytes(&self.to_le_bytes());
                }
                Ok(())
            }

            fn decode(
                stream: &mut BitStream,
                packed: bool,
                _limits: &CodecLimits,
            ) -> CodecResult<Self> {
                if packed {
                    return Ok(read_varuint(stream, $width)? as $ty);
                }
                let mut bytes = [0u8; $width / 8];
                stream.read_bytes(&mut bytes)?;
                Ok(<$ty>::from_le_bytes(bytes))
            }
        }
    )*};
}

macro_rules! impl_signed {
    ($($ty:ty => $width:literal),* $(,)?) => {$(
        impl Field for $ty {
            const MIN_BITS: usize = 8;

            fn encode(&self, stream: &mut BitStream, packed: bool) -> CodecResult<()> {
                if packed {
                    write_varint(stream, i64::from(*self));
                } else {
                    stream.write_bytes(&self.to_le_bytes());
                }
                Ok(())
            }

            fn decode(
                stream: &mut BitStream,
                packed: bool,
                _limits: &CodecLimits,
            ) -> CodecResult<Self> {
                if packed {
                    return Ok(read_varint(stream, $width)? as $ty);
                }
                let mut bytes = [0u8; $width / 8];
                stream.read_bytes(&mut bytes)?;
                Ok(<$ty>::from_le_bytes(bytes))
            }
        }
    )*};
}

impl_unsigned!(u16 => 16, u32 => 32, u64 => 64);
impl_signed!(i16 => 16, i32 => 32, i64 => 64);

impl Field for f32 {
    const MIN_BITS: usize = 8;

    fn encode(&self, stream: &mut BitStream, packed: bool) -> CodecResult<()> {
        if packed {
            write_f32_packed(stream, *self);
        } else {
            stream.write_bytes(&self.to_bits().to_le_bytes());
        }
        Ok(())
    }

    fn decode(stream: &mut BitStream, packed: bool, _limits: &CodecLimits) -> CodecResult<Self> {
        if packed {
            read_f32_packed(stream)
        } else {
            read_f32_raw(stream)
        }
    }
}

impl Field for f64 {
    const MIN_BITS: usize = 8;

    fn encode(&self, stream: &mut BitStream, packed: bool) -> CodecResult<()> {
        if packed {
            write_f64_packed(stream, *self);
        } else {
            stream.write_bytes(&self.to_bits().to_le_bytes());
        }
        Ok(())
    }

    fn decode(stream: &mut BitStream, packed: bool, _limits: &CodecLimits) -> CodecResult<Self> {
        if packed {
            read_f64_packed(stream)
        } else {
            read_f64_raw(stream)
        }
    }
}

impl Field for char {
    const MIN_BITS: usize = 8;

    fn encode(&self, stream: &mut BitStream, packed: bool) -> CodecResult<()> {
        u32::from(*self).encode(stream, packed)
    }

    fn decode(stream: &mut BitStream, packed: bool, limits: &CodecLimits) -> CodecResult<Self> {
        let value = u32::decode(stream, packed, limits)?;
        Self::from_u32(value).ok_or(CodecError::InvalidChar { value })
    }
}

impl Field for String {
    const MIN_BITS: usize = 8;

    fn encode(&self, stream: &mut BitStream, packed: bool) -> CodecResult<()> {
        let bytes = self.as_bytes();
        let len = u32::try_from(bytes.len()).map_err(|_| CodecError::LengthOverflow {
            length: bytes.len(),
        })?;
        len.encode(stream, packed)?;
        stream.write_bytes(bytes);
        Ok(())
    }

    fn decode(stream: &mut BitStream, packed: bool, limits: &CodecLimits) -> CodecResult<Self> {
        let declared = u32::decode(stream, packed, limits)?;
        let len = usize::try_from(declared).map_err(|_| CodecError::LengthOverflow {
            length: usize::MAX,
        })?;
        if len > limits.max_string_bytes {
            return Err(CodecError::LimitsExceeded {
                kind: LimitKind::StringBytes,
                limit: limits.max_string_bytes,
                actual: len,
            });
        }
        check_remaining(stream, len, 8)?;
        let mut bytes = vec![0u8; len];
        stream.read_bytes(&mut bytes)?;
        Self::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)
    }
}

impl<T: Field> Field for Option<T> {
    const MIN_BITS: usize = 1;

    fn encode(&self, stream: &mut BitStream, packed: bool) -> CodecResult<()> {
        stream.write_bit(self.is_some());
        match self {
            Some(value) => value.encode(stream, packed),
            None => Ok(()),
        }
    }

    fn decode(stream: &mut BitStream, packed: bool, limits: &CodecLimits) -> CodecResult<Self> {
        if stream.read_bit()? {
            T::decode(stream, packed, limits).map(Some)
        } else {
            Ok(None)
        }
    }
}

impl<T: Field + Default, const N: usize> Field for [T; N] {
    const MIN_BITS: usize = T::MIN_BITS * N;

    fn encode(&self, stream: &mut BitStream, packed: bool) -> CodecResult<()> {
        for item in self {
            item.encode(stream, packed)?;
        }
        Ok(())
    }

    fn decode(stream: &mut BitStream, packed: bool, limits: &CodecLimits) -> CodecResult<Self> {
        let mut failure = None;
        let items = std::array::from_fn(|_| {
            if failure.is_some() {
                return T::default();
            }
            T::decode(stream, packed, limits).unwrap_or_else(|err| {
                failure = Some(err);
                T::default()
            })
        });
        failure.map_or(Ok(items), Err)
    }
}

macro_rules! impl_tuple {
    ($($name:ident),+) => {
        impl<$($name: Field),+> Field for ($($name,)+) {
            const MIN_BITS: usize = 0 $(+ $name::MIN_BITS)+;

            #[allow(non_snake_case)]
            fn encode(&self, stream: &mut BitStream, packed: bool) -> CodecResult<()> {
                let ($($name,)+) = self;
                $($name.encode(stream, packed)?;)+
                Ok(())
            }

            fn decode(
                stream: &mut BitStream,
                packed: bool,
                limits: &CodecLimits,
            ) -> CodecResult<Self> {
                Ok(($($name::decode(stream, packed, limits)?,)+))
            }
        }
    };
}

impl_tuple!(A, B);
impl_tuple!(A, B, C);
impl_tuple!(A, B, C, D);
