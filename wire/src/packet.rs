//! Packet tags and frame classification.

use std::fmt;

use crate::error::{DecodeError, LimitKind, WireResult};
use crate::limits::Limits;

/// Keep-alive frame the client sends on connect and periodically after.
pub const PING_FRAME: [u8; 2] = [PacketTag::Ping as u8, 0];

/// Packet tag carried in the first byte of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketTag {
    EntityUpdate = 0,
    PlayerCounterUpdate = 1,
    SetWorldDimensions = 2,
    Input = 3,
    EnterWorld = 4,
    Ping = 7,
    Rpc = 9,
    UdpConnect = 10,
    UdpTick = 11,
    UdpAckTick = 12,
    UdpPong = 13,
    UdpPingWithCompressedUids = 14,
    UdpFragment = 15,
    UdpConnect1300 = 16,
    UdpConnect500 = 17,
}

impl PacketTag {
    /// Parses a packet tag from a raw byte.
    pub const fn parse(tag: u8) -> WireResult<Self> {
        Ok(match tag {
            0 => Self::EntityUpdate,
            1 => Self::PlayerCounterUpdate,
            2 => Self::SetWorldDimensions,
            3 => Self::Input,
            4 => Self::EnterWorld,
            7 => Self::Ping,
            9 => Self::Rpc,
            10 => Self::UdpConnect,
            11 => Self::UdpTick,
            12 => Self::UdpAckTick,
            13 => Self::UdpPong,
            14 => Self::UdpPingWithCompressedUids,
            15 => Self::UdpFragment,
            16 => Self::UdpConnect1300,
            17 => Self::UdpConnect500,
            _ => return Err(DecodeError::UnknownPacketTag { tag }),
        })
    }

    /// Classifies a frame by its first byte.
    pub fn of(frame: &[u8]) -> WireResult<Self> {
        let first = frame.first().ok_or(DecodeError::FrameTooSmall {
            actual: 0,
            required: 1,
        })?;
        Self::parse(*first)
    }

    /// Returns the raw tag byte.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns `true` for tags whose bodies this codec decodes.
    ///
    /// Everything else is forwarded opaquely.
    #[must_use]
    pub const fn is_core(self) -> bool {
        matches!(
            self,
            Self::EntityUpdate | Self::EnterWorld | Self::Ping | Self::Rpc
        )
    }
}

impl fmt::Display for PacketTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Checks the frame against `limits` and that it carries `expected`.
///
/// Returns the body following the tag byte.
pub fn expect_frame<'a>(
    frame: &'a [u8],
    expected: PacketTag,
    limits: &Limits,
) -> WireResult<&'a [u8]> {
    check_frame_len(frame, limits)?;
    let found = PacketTag::of(frame)?;
    if found != expected {
        return Err(DecodeError::UnexpectedPacketTag { expected, found });
    }
    Ok(&frame[1..])
}

/// Rejects frames larger than [`Limits::max_frame_bytes`].
pub fn check_frame_len(frame: &[u8], limits: &Limits) -> WireResult<()> {
    if frame.len() > limits.max_frame_bytes {
        return Err(DecodeError::LimitsExceeded {
            kind: LimitKind::FrameBytes,
            limit: limits.max_frame_bytes,
            actual: frame.len(),
        });
    }
    Ok(())
}
