//! Inspection and debugging tools for the syncodec codec.
//!
//! This crate explains what the codec does to individual values:
//!
//! - Render captured bytes as hex escapes
//! - Show the packed and unpacked size of an integer
//! - Show the quantization error of a packed float
//!
//! Every report renders as plain text through `Display` and as JSON through
//! `serde`, so the `syncodec-tools` binary can emit either.

use std::fmt;

use bitstream::BitStream;
use codec::float::{F32_PACKED_TOLERANCE, F64_PACKED_TOLERANCE};
use codec::varint::{varuint_len, zigzag_encode};
use codec::{debug_bytes, CodecLimits, CodecResult, Field};
use serde::Serialize;

/// Bytes rendered as `\xAB` escapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HexReport {
    pub total_bytes: usize,
    pub shown_bytes: usize,
    pub escaped: String,
}

impl fmt::Display for HexReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "bytes: {} (showing {})", self.total_bytes, self.shown_bytes)?;
        write!(f, "{}", self.escaped)
    }
}

#[must_use]
pub fn hex_report(bytes: &[u8], limit: Option<usize>) -> HexReport {
    let shown_bytes = limit.map_or(bytes.len(), |limit| limit.min(bytes.len()));
    HexReport {
        total_bytes: bytes.len(),
        shown_bytes,
        escaped: debug_bytes(bytes, limit),
    }
}

/// Packed and unpacked encodings of one integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegerReport {
    pub value: String,
    pub signed: bool,
    /// Unsigned value fed to the varint, after zig-zag for signed input.
    pub varint_value: u64,
    pub packed: String,
    pub packed_len: usize,
    pub unpacked_len: usize,
}

impl fmt::Display for IntegerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.signed { "i64" } else { "u64" };
        writeln!(f, "value: {} ({kind})", self.value)?;
        if self.signed {
            writeln!(f, "zigzag: {}", self.varint_value)?;
        }
        writeln!(f, "packed: {} ({} bytes)", self.packed, self.packed_len)?;
        write!(f, "unpacked: {} bytes", self.unpacked_len)
    }
}

/// Reports the encodings of an unsigned 64-bit integer.
pub fn unsigned_report(value: u64) -> CodecResult<IntegerReport> {
    let packed = encode(&value, true)?;
    debug_assert_eq!(packed.len(), varuint_len(value));
    Ok(IntegerReport {
        value: value.to_string(),
        signed: false,
        varint_value: value,
        packed: debug_bytes(&packed, None),
        packed_len: packed.len(),
        unpacked_len: encode(&value, false)?.len(),
    })
}

/// Reports the encodings of a signed 64-bit integer.
pub fn signed_report(value: i64) -> CodecResult<IntegerReport> {
    let packed = encode(&value, true)?;
    Ok(IntegerReport {
        value: value.to_string(),
        signed: true,
        varint_value: zigzag_encode(value),
        packed: debug_bytes(&packed, None),
        packed_len: packed.len(),
        unpacked_len: encode(&value, false)?.len(),
    })
}

/// Packed round trip of one float.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloatReport {
    pub input: f64,
    pub double: bool,
    pub decoded: f64,
    pub error: f64,
    pub tolerance: f64,
    /// `true` if the value took the raw escape path.
    pub escaped: bool,
    pub packed: String,
    pub packed_len: usize,
    pub unpacked_len: usize,
}

impl fmt::Display for FloatReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.double { "f64" } else { "f32" };
        writeln!(f, "value: {} ({kind})", self.input)?;
        writeln!(f, "packed: {} ({} bytes)", self.packed, self.packed_len)?;
        if self.escaped {
            writeln!(f, "escape: raw bits, exact")?;
        } else {
            writeln!(
                f,
                "decoded: {} (error {:e}, tolerance {:e})",
                self.decoded, self.error, self.tolerance
            )?;
        }
        write!(f, "unpacked: {} bytes", self.unpacked_len)
    }
}

/// Reports the packed round trip of `value` as an `f32`.
#[allow(clippy::cast_possible_truncation)]
pub fn f32_report(value: f64) -> CodecResult<FloatReport> {
    let narrowed = value as f32;
    let packed = encode(&narrowed, true)?;
    let decoded: f32 = decode(&packed, true)?;
    Ok(FloatReport {
        input: f64::from(narrowed),
        double: false,
        decoded: f64::from(decoded),
        error: f64::from((decoded - narrowed).abs()),
        tolerance: f64::from(F32_PACKED_TOLERANCE),
        escaped: packed.first() == Some(&0),
        packed: debug_bytes(&packed, None),
        packed_len: packed.len(),
        unpacked_len: encode(&narrowed, false)?.len(),
    })
}

/// Reports the packed round trip of `value` as an `f64`.
pub fn f64_report(value: f64) -> CodecResult<FloatReport> {
    let packed = encode(&value, true)?;
    let decoded: f64 = decode(&packed, true)?;
    Ok(FloatReport {
        input: value,
        double: true,
        decoded,
        error: (decoded - value).abs(),
        tolerance: F64_PACKED_TOLERANCE,
        escaped: packed.first() == Some(&0),
        packed: debug_bytes(&packed, None),
        packed_len: packed.len(),
        unpacked_len: encode(&value, false)?.len(),
    })
}

fn encode<T: Field>(value: &T, packed: bool) -> CodecResult<Vec<u8>> {
    let mut stream = BitStream::new();
    value.encode(&mut stream, packed)?;
    Ok(stream.into_vec())
}

fn decode<T: Field>(bytes: &[u8], packed: bool) -> CodecResult<T> {
    let mut stream = BitStream::from_slice(bytes);
    T::decode(&mut stream, packed, &CodecLimits::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_report_limits_output() {
        let report = hex_report(&[0xDE, 0xAD, 0xBE, 0xEF], Some(2));
        assert_eq!(report.total_bytes, 4);
        assert_eq!(report.shown_bytes, 2);
        assert_eq!(report.escaped, "\\xDE\\xAD");
        assert!(report.to_string().contains("showing 2"));
    }

    #[test]
    fn unsigned_report_sizes() {
        let report = unsigned_report(300).unwrap();
        assert_eq!(report.packed, "\\xAC\\x02");
        assert_eq!(report.packed_len, 2);
        assert_eq!(report.unpacked_len, 8);
    }

    #[test]
    fn signed_report_shows_zigzag() {
        let report = signed_report(-1).unwrap();
        assert_eq!(report.varint_value, 1);
        assert_eq!(report.packed, "\\x01");
        assert!(report.to_string().contains("zigzag: 1"));
    }

    #[test]
    fn f32_report_within_tolerance() {
        let report = f32_report(0.1).unwrap();
        assert!(!report.escaped);
        assert!(report.error <= report.tolerance);
        assert_eq!(report.unpacked_len, 4);
    }

    #[test]
    fn f64_report_escape_path() {
        let report = f64_report(1.0e300).unwrap();
        assert!(report.escaped);
        assert_eq!(report.error, 0.0);
        assert_eq!(report.packed_len, 9);
    }

    #[test]
    fn reports_serialize_to_json() {
        let json = serde_json::to_value(unsigned_report(5).unwrap()).unwrap();
        assert_eq!(json["packed_len"], 1);
        let json = serde_json::to_value(f64_report(2.5).unwrap()).unwrap();
        assert_eq!(json["decoded"], 2.5);
    }
}
