//! `EnterWorld` request frame sent by the client to open a session.
//!
//! Layout: `[tag=4][displayName: u8-len string][version: u32][proofOfWork: u8-len bytes]`.

use bitstream::{ByteReader, ByteWriter};

use crate::error::{EncodeError, WireResult};
use crate::keystream::Keystream;
use crate::limits::Limits;
use crate::packet::{expect_frame, PacketTag};

/// Client request to enter the world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnterWorldRequest {
    pub display_name: String,
    pub version: u32,
    /// Opaque proof-of-work blob; only its role as a keystream input matters here.
    pub proof_of_work: Vec<u8>,
}

impl EnterWorldRequest {
    /// Decodes a full `EnterWorld` request frame, tag byte included.
    pub fn decode(frame: &[u8], limits: &Limits) -> WireResult<Self> {
        let body = expect_frame(frame, PacketTag::EnterWorld, limits)?;
        let mut reader = ByteReader::new(body);
        let display_name = reader.read_string()?;
        let version = reader.read_u32()?;
        let proof_of_work = reader.read_array_u8()?;
        Ok(Self {
            display_name,
            version,
            proof_of_work,
        })
    }

    /// Encodes the request as a full frame.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut writer =
            ByteWriter::with_capacity(7 + self.display_name.len() + self.proof_of_work.len());
        writer.write_u8(PacketTag::EnterWorld.as_u8());
        writer.write_string(&self.display_name)?;
        writer.write_u32(self.version);
        writer.write_array_u8(&self.proof_of_work)?;
        Ok(writer.finish())
    }

    /// Derives the session keystream for the endpoint this request is sent to.
    ///
    /// `endpoint_path` is the URL path including its leading `/`.
    #[must_use]
    pub fn keystream_for(&self, endpoint_path: &str) -> Keystream {
        Keystream::derive(self.version, endpoint_path.as_bytes(), &self.proof_of_work)
    }
}
