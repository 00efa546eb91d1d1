//! RPC frame header.
//!
//! Layout after decryption: `[tag=9][wireIndex: u32][repeat: u16]?[params...]`.
//! The repeat count is only present for array-mode RPCs, which the header
//! alone cannot tell; the caller knows from the schema.

use bitstream::{ByteReader, ByteWriter};

use crate::error::WireResult;
use crate::limits::Limits;
use crate::packet::{expect_frame, PacketTag};

/// Offset of the first parameter byte in a scalar RPC frame.
pub const RPC_HEADER_SIZE: usize = 5;

/// Offset of the first parameter byte in an array-mode RPC frame.
pub const RPC_ARRAY_HEADER_SIZE: usize = 7;

/// Reads the wire index of a decrypted RPC frame.
pub fn peek_rpc_index(frame: &[u8], limits: &Limits) -> WireResult<u32> {
    let body = expect_frame(frame, PacketTag::Rpc, limits)?;
    Ok(ByteReader::new(body).read_u32()?)
}

/// Writes the tag and wire index of an RPC frame.
pub fn write_rpc_header(writer: &mut ByteWriter, wire_index: u32) {
    writer.write_u8(PacketTag::Rpc.as_u8());
    writer.write_u32(wire_index);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;

    #[test]
    fn header_roundtrip() {
        let mut writer = ByteWriter::new();
        write_rpc_header(&mut writer, 0x0102_0304);
        let bytes = writer.finish();
        assert_eq!(bytes.len(), RPC_HEADER_SIZE);
        assert_eq!(peek_rpc_index(&bytes, &Limits::default()).unwrap(), 0x0102_0304);
    }

    #[test]
    fn peek_short_frame() {
        let err = peek_rpc_index(&[9, 1, 2], &Limits::default()).unwrap_err();
        assert!(matches!(err, DecodeError::Cursor(_)));
    }

    #[test]
    fn peek_wrong_tag() {
        let err = peek_rpc_index(&[0, 1, 0, 0, 0], &Limits::default()).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedPacketTag { .. }));
    }
}
