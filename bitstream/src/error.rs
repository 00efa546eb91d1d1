//! Error types for cursor operations.

use std::fmt;

/// Result type for cursor operations.
pub type CursorResult<T> = Result<T, CursorError>;

/// Errors that can occur while reading or writing a byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    /// Attempted to read past the end of the buffer.
    BufferUnderflow {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// A signed length prefix was negative.
    InvalidLength {
        /// The raw length prefix.
        length: i64,
    },

    /// A string or array is too long for its length prefix.
    LengthOverflow {
        /// The actual length.
        length: usize,
        /// Maximum length the prefix can express.
        max: usize,
    },

    /// A character cannot be written as a single Latin-1 byte.
    UnencodableChar {
        /// The offending character.
        ch: char,
    },

    /// Gzip payload could not be inflated.
    Decompress {
        /// Description reported by the inflater.
        reason: String,
    },

    /// Gzip payload could not be produced.
    Compress {
        /// Description reported by the deflater.
        reason: String,
    },

    /// Inflated payload exceeded the configured ceiling.
    DecompressedTooLarge {
        /// Maximum number of inflated bytes.
        limit: usize,
    },
}

impl fmt::Display for CursorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferUnderflow {
                requested,
                available,
            } => {
                write!(
                    f,
                    "buffer underflow: attempted to read {requested} bytes but only {available} bytes available"
                )
            }
            Self::InvalidLength { length } => {
                write!(f, "invalid length prefix {length}")
            }
            Self::LengthOverflow { length, max } => {
                write!(f, "length {length} exceeds prefix maximum {max}")
            }
            Self::UnencodableChar { ch } => {
                write!(f, "character {ch:?} is not representable as a single byte")
            }
            Self::Decompress { reason } => write!(f, "gzip decompress failed: {reason}"),
            Self::Compress { reason } => write!(f, "gzip compress failed: {reason}"),
            Self::DecompressedTooLarge { limit } => {
                write!(f, "decompressed payload exceeds {limit} bytes")
            }
        }
    }
}

impl std::error::Error for CursorError {}
