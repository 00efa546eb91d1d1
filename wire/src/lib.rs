//! Wire framing for the tickwire protocol codec.
//!
//! This crate handles the outer frame format: packet tags, limit
//! enforcement, the session keystream and RPC frame cipher, and the client
//! `EnterWorld` request. It does not know about entity maps or RPC
//! parameter layouts, only the structure of frames.
//!
//! # Design Principles
//!
//! - **Bounded decoding** - Frames are checked against [`Limits`] before parsing.
//! - **No domain knowledge** - This crate handles framing, not game state.
//! - **Opaque forwarding** - Tags outside the core set classify but are never decoded.

mod enter_world;
mod error;
mod keystream;
mod limits;
mod packet;
mod rpc;

pub use enter_world::EnterWorldRequest;
pub use error::{DecodeError, EncodeError, LimitKind, WireResult};
pub use keystream::{crypt_rpc_frame, crypt_rpc_frame_in_place, Keystream, KEYSTREAM_LEN};
pub use limits::Limits;
pub use packet::{check_frame_len, expect_frame, PacketTag, PING_FRAME};
pub use rpc::{peek_rpc_index, write_rpc_header, RPC_ARRAY_HEADER_SIZE, RPC_HEADER_SIZE};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = KEYSTREAM_LEN;
        let _ = RPC_HEADER_SIZE;
        let _ = PacketTag::EnterWorld;
        let _ = Limits::default();
        let _ = Keystream::default();

        // Error types
        let _: WireResult<()> = Ok(());
    }

    #[test]
    fn ping_frame_classifies() {
        assert_eq!(PacketTag::of(&PING_FRAME).unwrap(), PacketTag::Ping);
    }

    #[test]
    fn keystream_and_rpc_header_integration() {
        let key = Keystream::derive(5, b"/path", &[9; 24]);
        let mut writer = bitstream::ByteWriter::new();
        write_rpc_header(&mut writer, 3);
        writer.write_u32(0xAABB_CCDD);
        let plain = writer.finish();

        let ciphered = crypt_rpc_frame(&plain, &key);
        assert_eq!(PacketTag::of(&ciphered).unwrap(), PacketTag::Rpc);
        let restored = crypt_rpc_frame(&ciphered, &key);
        assert_eq!(peek_rpc_index(&restored, &Limits::default()).unwrap(), 3);
    }
}
