//! Session keystream derivation and the RPC frame cipher.

use std::fmt;

use crate::error::{DecodeError, WireResult};

/// Keystream length in bytes. All indexing wraps modulo this length.
pub const KEYSTREAM_LEN: usize = 8;

/// The 8-byte XOR keystream for one session.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Keystream([u8; KEYSTREAM_LEN]);

impl Keystream {
    /// Derives the keystream from the session version, the endpoint path
    /// and the proof-of-work blob.
    ///
    /// The three passes run in a fixed order and do not commute:
    /// proof-of-work bytes are folded in first, then every byte is XORed
    /// with the low byte of `version`, then the path bytes are folded in.
    #[must_use]
    pub fn derive(version: u32, endpoint_path: &[u8], proof_of_work: &[u8]) -> Self {
        let mut key = [0u8; KEYSTREAM_LEN];
        fold(&mut key, proof_of_work);
        let version = version.to_le_bytes()[0];
        for byte in &mut key {
            *byte ^= version;
        }
        fold(&mut key, endpoint_path);
        Self(key)
    }

    /// Builds a keystream from raw bytes.
    pub fn from_slice(bytes: &[u8]) -> WireResult<Self> {
        let key: [u8; KEYSTREAM_LEN] = bytes
            .try_into()
            .map_err(|_| DecodeError::KeystreamLengthMismatch {
                actual: bytes.len(),
            })?;
        Ok(Self(key))
    }

    /// Returns the raw keystream bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; KEYSTREAM_LEN] {
        &self.0
    }

    /// Returns the key byte used at frame offset `index`.
    #[must_use]
    pub const fn byte_at(&self, index: usize) -> u8 {
        self.0[index % KEYSTREAM_LEN]
    }
}

impl From<[u8; KEYSTREAM_LEN]> for Keystream {
    fn from(bytes: [u8; KEYSTREAM_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for Keystream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keystream({self})")
    }
}

impl fmt::Display for Keystream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

fn fold(key: &mut [u8; KEYSTREAM_LEN], bytes: &[u8]) {
    for (i, byte) in bytes.iter().enumerate() {
        key[i % KEYSTREAM_LEN] ^= byte;
    }
}

/// Returns a ciphered copy of an RPC frame.
///
/// Byte 0 (the packet tag) is left untouched; byte `i >= 1` is XORed with
/// `keystream[i % 8]`. The operation is its own inverse.
#[must_use]
pub fn crypt_rpc_frame(frame: &[u8], keystream: &Keystream) -> Vec<u8> {
    let mut out = frame.to_vec();
    crypt_rpc_frame_in_place(&mut out, keystream);
    out
}

/// In-place variant of [`crypt_rpc_frame`].
pub fn crypt_rpc_frame_in_place(frame: &mut [u8], keystream: &Keystream) {
    for (i, byte) in frame.iter_mut().enumerate().skip(1) {
        *byte ^= keystream.byte_at(i);
    }
}
