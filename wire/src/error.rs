//! Error types for wire format operations.

use std::fmt;

use bitstream::CursorError;

use crate::packet::PacketTag;

/// Result type for wire format operations.
pub type WireResult<T> = Result<T, DecodeError>;

/// High-level decode errors for wire framing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// Frame is too small to contain the required header.
    FrameTooSmall { actual: usize, required: usize },

    /// First byte of the frame is not a known packet tag.
    UnknownPacketTag { tag: u8 },

    /// Frame carries a different packet tag than the caller expected.
    UnexpectedPacketTag {
        expected: PacketTag,
        found: PacketTag,
    },

    /// A keystream was built from a slice that is not exactly 8 bytes.
    KeystreamLengthMismatch { actual: usize },

    /// Limits exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// Underlying cursor failure.
    Cursor(CursorError),
}

/// Specific wire limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    FrameBytes,
}

/// Errors that can occur during encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A value could not be written by the cursor.
    Cursor(CursorError),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrameTooSmall { actual, required } => {
                write!(
                    f,
                    "frame too small: {actual} bytes, need at least {required}"
                )
            }
            Self::UnknownPacketTag { tag } => write!(f, "unknown packet tag: {tag}"),
            Self::UnexpectedPacketTag { expected, found } => {
                write!(f, "unexpected packet tag: expected {expected}, found {found}")
            }
            Self::KeystreamLengthMismatch { actual } => {
                write!(f, "keystream must be 8 bytes, got {actual}")
            }
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
            Self::Cursor(err) => write!(f, "cursor error: {err}"),
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FrameBytes => "frame bytes",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cursor(err) => write!(f, "cursor error: {err}"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Cursor(err) => Some(err),
            _ => None,
        }
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Cursor(err) => Some(err),
        }
    }
}

impl From<CursorError> for DecodeError {
    fn from(err: CursorError) -> Self {
        Self::Cursor(err)
    }
}

impl From<CursorError> for EncodeError {
    fn from(err: CursorError) -> Self {
        Self::Cursor(err)
    }
}
