//! Error types for codec operations.

use std::fmt;

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Bitstream error, typically a read past the end of the stream.
    #[error("bitstream error: {0}")]
    Bitstream(#[from] bitstream::BitError),

    /// A length field describes more data than remains in the stream.
    #[error(
        "declared length {declared} needs at least {min_bits} bits per element, \
         only {available_bits} bits remain"
    )]
    Truncated {
        declared: usize,
        min_bits: usize,
        available_bits: usize,
    },

    /// An array length below the null sentinel.
    #[error("invalid array length {length}")]
    InvalidLength { length: i64 },

    /// A value is too long for its length prefix.
    #[error("length {length} does not fit the length prefix")]
    LengthOverflow { length: usize },

    /// Limits exceeded.
    #[error("{kind} limit exceeded: {actual} > {limit}")]
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// Varint is too long or overflows its integer width.
    #[error("invalid varint for a {width}-bit integer")]
    InvalidVarint { width: u8 },

    /// String bytes are not valid UTF-8.
    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    /// Decoded value is not a Unicode scalar value.
    #[error("invalid char value 0x{value:X}")]
    InvalidChar { value: u32 },

    /// Decoded discriminant does not name a variant.
    #[error("unknown enum discriminant {value}")]
    InvalidEnum { value: i64 },

    /// Output buffer is too small.
    #[error("output too small: need {needed}, have {available}")]
    OutputTooSmall { needed: usize, available: usize },
}

impl CodecError {
    /// Returns `true` if the error leaves the reader out of step with the
    /// writer, so no later field of the same stream can be trusted.
    #[must_use]
    pub const fn is_framing(&self) -> bool {
        matches!(
            self,
            Self::Bitstream(_)
                | Self::Truncated { .. }
                | Self::InvalidLength { .. }
                | Self::InvalidVarint { .. }
        )
    }
}

/// Specific limit that was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    ArrayLength,
    StringBytes,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ArrayLength => "array length",
            Self::StringBytes => "string bytes",
        };
        write!(f, "{name}")
    }
}
