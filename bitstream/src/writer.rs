//! Byte-level writer mirroring [`ByteReader`](crate::ByteReader).

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{CursorError, CursorResult};

/// A growable byte writer.
///
/// Every write appends to the backing buffer; already-written bytes are
/// never truncated. Call [`finish`](Self::finish) to take the buffer.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    bytes: Vec<u8>,
}

impl ByteWriter {
    /// Creates a new empty `ByteWriter`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `ByteWriter` with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
        }
    }

    /// Returns the number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the bytes written so far.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Finishes writing and returns the byte buffer.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }

    /// Appends raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Writes a `u8`.
    pub fn write_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    /// Writes an `i8`.
    pub fn write_i8(&mut self, value: i8) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a big-endian `u16`.
    pub fn write_u16(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes a big-endian `i16`.
    pub fn write_i16(&mut self, value: i16) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes a little-endian `u32`.
    pub fn write_u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a little-endian `i32`.
    pub fn write_i32(&mut self, value: i32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a little-endian `u64`.
    pub fn write_u64(&mut self, value: u64) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a little-endian `i64`.
    pub fn write_i64(&mut self, value: i64) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a string with a 1-byte length prefix, one Latin-1 byte per char.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::LengthOverflow`] for more than 255 characters and
    /// [`CursorError::UnencodableChar`] for characters above U+00FF. Nothing is
    /// written on error.
    pub fn write_string(&mut self, value: &str) -> CursorResult<()> {
        let encoded = value
            .chars()
            .map(|ch| u8::try_from(u32::from(ch)).map_err(|_| CursorError::UnencodableChar { ch }))
            .collect::<CursorResult<Vec<u8>>>()?;
        let len = u8::try_from(encoded.len()).map_err(|_| CursorError::LengthOverflow {
            length: encoded.len(),
            max: usize::from(u8::MAX),
        })?;
        self.write_u8(len);
        self.write_bytes(&encoded);
        Ok(())
    }

    /// Writes a gzip-compressed UTF-8 string with a 4-byte length prefix.
    pub fn write_compressed_string(&mut self, value: &str) -> CursorResult<()> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(value.as_bytes())
            .map_err(|err| CursorError::Compress {
                reason: err.to_string(),
            })?;
        let compressed = encoder.finish().map_err(|err| CursorError::Compress {
            reason: err.to_string(),
        })?;
        let len = u32::try_from(compressed.len()).map_err(|_| CursorError::LengthOverflow {
            length: compressed.len(),
            max: u32::MAX as usize,
        })?;
        self.write_u32(len);
        self.write_bytes(&compressed);
        Ok(())
    }

    /// Writes a pair of `u8` values.
    pub fn write_u8_vector2(&mut self, x: u8, y: u8) {
        self.write_u8(x);
        self.write_u8(y);
    }

    /// Writes a pair of little-endian `i32` values.
    pub fn write_i32_vector2(&mut self, x: i32, y: i32) {
        self.write_i32(x);
        self.write_i32(y);
    }

    /// Writes an `i32`-prefixed array of `i32` pairs.
    pub fn write_array_i32_vector2(&mut self, values: &[(i32, i32)]) -> CursorResult<()> {
        self.write_array_len(values.len())?;
        for &(x, y) in values {
            self.write_i32_vector2(x, y);
        }
        Ok(())
    }

    /// Writes an `i32`-prefixed array of `u32` values.
    pub fn write_array_u32(&mut self, values: &[u32]) -> CursorResult<()> {
        self.write_array_len(values.len())?;
        for &value in values {
            self.write_u32(value);
        }
        Ok(())
    }

    /// Writes an `i32`-prefixed array of `i32` values.
    pub fn write_array_i32(&mut self, values: &[i32]) -> CursorResult<()> {
        self.write_array_len(values.len())?;
        for &value in values {
            self.write_i32(value);
        }
        Ok(())
    }

    /// Writes a `u8`-prefixed array of bytes.
    pub fn write_array_u8(&mut self, values: &[u8]) -> CursorResult<()> {
        let len = u8::try_from(values.len()).map_err(|_| CursorError::LengthOverflow {
            length: values.len(),
            max: usize::from(u8::MAX),
        })?;
        self.write_u8(len);
        self.write_bytes(values);
        Ok(())
    }

    fn write_array_len(&mut self, len: usize) -> CursorResult<()> {
        let len = i32::try_from(len).map_err(|_| CursorError::LengthOverflow {
            length: len,
            max: i32::MAX as usize,
        })?;
        self.write_i32(len);
        Ok(())
    }
}
