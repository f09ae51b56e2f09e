//! Limits for bounded decoding.

/// Limits enforced while decoding variable-length values.
///
/// Every declared length is also checked against the bits left in the stream
/// before anything is allocated; these limits cap well-formed but oversized
/// input on top of that.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodecLimits {
    /// Maximum number of elements in a decoded array.
    pub max_array_len: usize,
    /// Maximum number of bytes in a decoded string.
    pub max_string_bytes: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_array_len: 64 * 1024,
            max_string_bytes: 64 * 1024,
        }
    }
}

impl CodecLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_array_len: 64,
            max_string_bytes: 256,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_array_len: usize::MAX,
            max_string_bytes: usize::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_are_reasonable() {
        let limits = CodecLimits::default();
        assert!(limits.max_array_len >= 1024);
        assert!(limits.max_string_bytes >= 1024);
    }

    #[test]
    fn testing_limits_smaller() {
        let test_limits = CodecLimits::for_testing();
        let default_limits = CodecLimits::default();
        assert!(test_limits.max_array_len < default_limits.max_array_len);
        assert!(test_limits.max_string_bytes < default_limits.max_string_bytes);
    }

    #[test]
    fn unlimited_limits() {
        let limits = CodecLimits::unlimited();
        assert_eq!(limits.max_array_len, usize::MAX);
        assert_eq!(limits.max_string_bytes, usize::MAX);
    }
}
