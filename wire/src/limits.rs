//! Configurable limits for bounded decoding.

/// Wire-level limits for frame decoding.
///
/// Enforced before a frame body is parsed. Limits on schema and entity
/// counts belong to the codec layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum frame size in bytes.
    pub max_frame_bytes: usize,

    /// Maximum inflated size of a compressed string.
    pub max_decompressed_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            // Handshakes with large RPC tables run to tens of KB
            max_frame_bytes: 1024 * 1024,
            max_decompressed_bytes: bitstream::DEFAULT_MAX_DECOMPRESSED,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_frame_bytes: 4096,
            max_decompressed_bytes: 4096,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_frame_bytes: usize::MAX,
            max_decompressed_bytes: usize::MAX,
        }
    }
}
