//! One-shot helpers between whole objects and flat byte buffers.

use std::fmt::Write as _;

use bitstream::{BitStream, BufferPool};

use crate::error::{CodecError, CodecResult};
use crate::limits::CodecLimits;
use crate::serializer::{Serializable, Serializer};

/// Serializes `obj` into `target`, returning the number of bytes written.
///
/// Fails with [`CodecError::OutputTooSmall`] if the encoding does not fit;
/// `target` is left untouched in that case.
pub fn dump<S: Serializable + ?Sized>(obj: &mut S, target: &mut [u8]) -> CodecResult<usize> {
    let mut stream = BitStream::with_capacity(target.len());
    obj.serialize(&mut Serializer::writer(&mut stream))?;
    copy_out(&stream, target)
}

/// Like [`dump`], but encodes into a buffer taken from `pool`.
pub fn dump_pooled<S: Serializable + ?Sized>(
    pool: &BufferPool,
    obj: &mut S,
    target: &mut [u8],
) -> CodecResult<usize> {
    let mut stream = pool.acquire();
    obj.serialize(&mut Serializer::writer(&mut stream))?;
    copy_out(&stream, target)
}

/// Serializes `obj` into a new vector.
pub fn dump_to_vec<S: Serializable + ?Sized>(obj: &mut S) -> CodecResult<Vec<u8>> {
    let mut stream = BitStream::new();
    obj.serialize(&mut Serializer::writer(&mut stream))?;
    Ok(stream.into_vec())
}

/// Deserializes `obj` from `source` with default limits, returning the
/// number of bytes consumed.
pub fn load<S: Serializable + ?Sized>(obj: &mut S, source: &[u8]) -> CodecResult<usize> {
    load_with_limits(obj, source, CodecLimits::default())
}

/// Deserializes `obj` from `source`, returning the number of bytes consumed.
pub fn load_with_limits<S: Serializable + ?Sized>(
    obj: &mut S,
    source: &[u8],
    limits: CodecLimits,
) -> CodecResult<usize> {
    let mut stream = BitStream::from_slice(source);
    obj.serialize(&mut Serializer::reader(&mut stream).with_limits(limits))?;
    Ok(stream.bytes_consumed())
}

/// Renders up to `limit` bytes as `\xAB` escapes for log output.
///
/// Every byte gets two upper-case digits, so `0x0A` renders as `\x0A`
/// rather than the shorter `\xA` some older dumps used.
#[must_use]
pub fn debug_bytes(bytes: &[u8], limit: Option<usize>) -> String {
    let shown = &bytes[..limit.map_or(bytes.len(), |limit| limit.min(bytes.len()))];
    let mut out = String::with_capacity(shown.len() * 4);
    for byte in shown {
        let _ = write!(out, "\\x{byte:02X}");
    }
    out
}

fn copy_out(stream: &BitStream, target: &mut [u8]) -> CodecResult<usize> {
    let encoded = stream.as_slice();
    let available = target.len();
    let dest = target
        .get_mut(..encoded.len())
        .ok_or(CodecError::OutputTooSmall {
            needed: encoded.len(),
            available,
        })?;
    dest.copy_from_slice(encoded);
    Ok(encoded.len())
}

#[cfg(test)]
mod tests {
    use bitstream::PoolConfig;

    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Snapshot {
        tick: u32,
        payload: Option<Vec<u8>>,
    }

    impl Serializable for Snapshot {
        fn serialize(&mut self, s: &mut Serializer<'_>) -> CodecResult<()> {
            s.value(&mut self.tick, true)?;
            s.bytes(&mut self.payload, true)
        }
    }

    #[test]
    fn dump_then_load() {
        let mut snapshot = Snapshot {
            tick: 1_000,
            payload: Some(vec![1, 2, 3]),
        };
        let mut target = [0u8; 32];
        let written = dump(&mut snapshot, &mut target).unwrap();
        assert_eq!(written, 2 + 1 + 3);

        let mut decoded = Snapshot::default();
        let read = load(&mut decoded, &target[..written]).unwrap();
        assert_eq!(read, written);
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn dump_reports_small_target() {
        let mut snapshot = Snapshot {
            tick: 1,
            payload: Some(vec![0; 10]),
        };
        let mut target = [0xAAu8; 4];
        let err = dump(&mut snapshot, &mut target).unwrap_err();
        assert_eq!(
            err,
            CodecError::OutputTooSmall {
                needed: 12,
                available: 4
            }
        );
        assert_eq!(target, [0xAA; 4]);
    }

    #[test]
    fn dump_pooled_returns_buffer() {
        let pool = BufferPool::new(PoolConfig::for_testing());
        let mut snapshot = Snapshot {
            tick: 7,
            payload: None,
        };
        let mut target = [0u8; 8];
        let written = dump_pooled(&pool, &mut snapshot, &mut target).unwrap();
        assert_eq!(dump_to_vec(&mut snapshot).unwrap(), target[..written]);
        assert_eq!(pool.stats().pooled, 1);

        let written = dump_pooled(&pool, &mut snapshot, &mut target).unwrap();
        assert_eq!(written, 2);
        assert_eq!(pool.stats().created, 1);
    }

    #[test]
    fn load_reports_consumed_bytes_only() {
        let mut snapshot = Snapshot {
            tick: 3,
            payload: Some(Vec::new()),
        };
        let mut bytes = dump_to_vec(&mut snapshot).unwrap();
        bytes.extend_from_slice(&[9, 9, 9]);
        let mut decoded = Snapshot::default();
        assert_eq!(load(&mut decoded, &bytes).unwrap(), 2);
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn load_with_limits_rejects_oversized_payload() {
        let mut snapshot = Snapshot {
            tick: 0,
            payload: Some(vec![0; 100]),
        };
        let bytes = dump_to_vec(&mut snapshot).unwrap();
        let mut decoded = Snapshot::default();
        let err = load_with_limits(&mut decoded, &bytes, CodecLimits::for_testing()).unwrap_err();
        assert!(matches!(err, CodecError::LimitsExceeded { .. }));
    }

    #[test]
    fn load_truncated_input_is_framing_error() {
        let mut decoded = Snapshot::default();
        let err = load(&mut decoded, &[0x05, 0x06, 0x01]).unwrap_err();
        assert!(err.is_framing());
    }

    #[test]
    fn debug_bytes_format() {
        assert_eq!(debug_bytes(&[0x00, 0xAB, 0x7F], None), "\\x00\\xAB\\x7F");
        assert_eq!(debug_bytes(&[0x01, 0x02, 0x03], Some(2)), "\\x01\\x02");
        assert_eq!(debug_bytes(&[0x01], Some(10)), "\\x01");
        assert_eq!(debug_bytes(&[0x0A], None), "\\x0A");
        assert_eq!(debug_bytes(&[], None), "");
    }
}
