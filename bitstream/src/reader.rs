//! Byte-level reader with bounded operations.

use std::io::Read;

use flate2::read::GzDecoder;

use crate::error::{CursorError, CursorResult};

/// Default ceiling for inflated compressed strings (1 MiB).
pub const DEFAULT_MAX_DECOMPRESSED: usize = 1 << 20;

/// A sequential reader over a borrowed byte buffer.
///
/// Multi-byte integers are little-endian, except 16-bit values which are
/// big-endian on this wire. All reads are bounds-checked and return
/// [`CursorError::BufferUnderflow`] instead of panicking.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    max_decompressed: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a new `ByteReader` positioned at the start of `data`.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            max_decompressed: DEFAULT_MAX_DECOMPRESSED,
        }
    }

    /// Sets the ceiling for inflated compressed strings.
    #[must_use]
    pub const fn with_max_decompressed(mut self, limit: usize) -> Self {
        self.max_decompressed = limit;
        self
    }

    /// Returns the number of bytes remaining to read.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns `true` if there are no more bytes to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the current byte offset.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns `true` if at least `n` more bytes can be read.
    #[must_use]
    pub const fn can_read(&self, n: usize) -> bool {
        n <= self.remaining()
    }

    /// Advances past `n` bytes.
    pub fn skip(&mut self, n: usize) -> CursorResult<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    /// Reads `n` raw bytes.
    pub fn read_bytes(&mut self, n: usize) -> CursorResult<&'a [u8]> {
        self.ensure(n)?;
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Reads a `u8`.
    pub fn read_u8(&mut self) -> CursorResult<u8> {
        let [value] = self.read_array::<1>()?;
        Ok(value)
    }

    /// Reads an `i8`.
    pub fn read_i8(&mut self) -> CursorResult<i8> {
        Ok(i8::from_le_bytes(self.read_array::<1>()?))
    }

    /// Reads a big-endian `u16`.
    pub fn read_u16(&mut self) -> CursorResult<u16> {
        Ok(u16::from_be_bytes(self.read_array::<2>()?))
    }

    /// Reads a big-endian `i16`.
    pub fn read_i16(&mut self) -> CursorResult<i16> {
        Ok(i16::from_be_bytes(self.read_array::<2>()?))
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32(&mut self) -> CursorResult<u32> {
        Ok(u32::from_le_bytes(self.read_array::<4>()?))
    }

    /// Reads a little-endian `i32`.
    pub fn read_i32(&mut self) -> CursorResult<i32> {
        Ok(i32::from_le_bytes(self.read_array::<4>()?))
    }

    /// Reads a little-endian `u64`.
    pub fn read_u64(&mut self) -> CursorResult<u64> {
        Ok(u64::from_le_bytes(self.read_array::<8>()?))
    }

    /// Reads a little-endian `i64`.
    pub fn read_i64(&mut self) -> CursorResult<i64> {
        Ok(i64::from_le_bytes(self.read_array::<8>()?))
    }

    /// Reads a string with a 1-byte length prefix.
    ///
    /// Each byte maps to one Latin-1 character; the payload is not UTF-8.
    pub fn read_string(&mut self) -> CursorResult<String> {
        let len = usize::from(self.read_u8()?);
        let bytes = self.read_bytes(len)?;
        Ok(bytes.iter().copied().map(char::from).collect())
    }

    /// Reads a gzip-compressed string with a 4-byte length prefix.
    pub fn read_compressed_string(&mut self) -> CursorResult<String> {
        let len = self.read_u32()? as usize;
        let compressed = self.read_bytes(len)?;

        let limit = self.max_decompressed;
        let mut inflated = Vec::new();
        GzDecoder::new(compressed)
            .take((limit as u64).saturating_add(1))
            .read_to_end(&mut inflated)
            .map_err(|err| CursorError::Decompress {
                reason: err.to_string(),
            })?;
        if inflated.len() > limit {
            return Err(CursorError::DecompressedTooLarge { limit });
        }
        Ok(String::from_utf8_lossy(&inflated).into_owned())
    }

    /// Reads a pair of `u8` values.
    pub fn read_u8_vector2(&mut self) -> CursorResult<(u8, u8)> {
        let x = self.read_u8()?;
        let y = self.read_u8()?;
        Ok((x, y))
    }

    /// Reads a pair of little-endian `i32` values.
    pub fn read_i32_vector2(&mut self) -> CursorResult<(i32, i32)> {
        let x = self.read_i32()?;
        let y = self.read_i32()?;
        Ok((x, y))
    }

    /// Reads an `i32`-prefixed array of `i32` pairs.
    pub fn read_array_i32_vector2(&mut self) -> CursorResult<Vec<(i32, i32)>> {
        let len = self.read_array_len(8)?;
        (0..len).map(|_| self.read_i32_vector2()).collect()
    }

    /// Reads an `i32`-prefixed array of `u32` values.
    pub fn read_array_u32(&mut self) -> CursorResult<Vec<u32>> {
        let len = self.read_array_len(4)?;
        (0..len).map(|_| self.read_u32()).collect()
    }

    /// Reads an `i32`-prefixed array of `i32` values.
    pub fn read_array_i32(&mut self) -> CursorResult<Vec<i32>> {
        let len = self.read_array_len(4)?;
        (0..len).map(|_| self.read_i32()).collect()
    }

    /// Reads a `u8`-prefixed array of bytes.
    pub fn read_array_u8(&mut self) -> CursorResult<Vec<u8>> {
        let len = usize::from(self.read_u8()?);
        Ok(self.read_bytes(len)?.to_vec())
    }

    /// Reads a signed 4-byte length and checks the payload fits before allocating.
    fn read_array_len(&mut self, elem_size: usize) -> CursorResult<usize> {
        let raw = self.read_i32()?;
        let len = usize::try_from(raw).map_err(|_| CursorError::InvalidLength {
            length: i64::from(raw),
        })?;
        self.ensure(len.saturating_mul(elem_size))?;
        Ok(len)
    }

    fn ensure(&self, n: usize) -> CursorResult<()> {
        let available = self.remaining();
        if n > available {
            return Err(CursorError::BufferUnderflow {
                requested: n,
                available,
            });
        }
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> CursorResult<[u8; N]> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_reader() {
        let reader = ByteReader::new(&[]);
        assert!(reader.is_empty());
        assert_eq!(reader.remaining(), 0);
        assert_eq!(reader.position(), 0);
        assert!(reader.can_read(0));
        assert!(!reader.can_read(1));
    }

    #[test]
    fn read_from_empty_fails() {
        let mut reader = ByteReader::new(&[]);
        let result = reader.read_u8();
        assert_eq!(
            result,
            Err(CursorError::BufferUnderflow {
                requested: 1,
                available: 0
            })
        );
    }

    #[test]
    fn read_u32_little_endian() {
        let mut reader = ByteReader::new(&[0x78, 0x56, 0x34, 0x12]);
        assert_eq!(reader.read_u32().unwrap(), 0x1234_5678);
        assert!(reader.is_empty());
    }

    #[test]
    fn read_u16_big_endian() {
        let mut reader = ByteReader::new(&[0x12, 0x34, 0xFF, 0xFE]);
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.read_i16().unwrap(), -2);
    }

    #[test]
    fn read_signed_values() {
        let mut reader = ByteReader::new(&[0xFF, 0xFE, 0xFF, 0xFF, 0xFF]);
        assert_eq!(reader.read_i8().unwrap(), -1);
        assert_eq!(reader.read_i32().unwrap(), -2);
    }

    #[test]
    fn partial_read_does_not_advance() {
        let mut reader = ByteReader::new(&[1, 2, 3]);
        let err = reader.read_u32().unwrap_err();
        assert!(matches!(
            err,
            CursorError::BufferUnderflow {
                requested: 4,
                available: 3
            }
        ));
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn read_string_latin1() {
        let mut reader = ByteReader::new(&[3, b'a', 0xE9, b'z']);
        assert_eq!(reader.read_string().unwrap(), "a\u{e9}z");
    }

    #[test]
    fn read_string_truncated() {
        let mut reader = ByteReader::new(&[5, b'a', b'b']);
        assert!(matches!(
            reader.read_string(),
            Err(CursorError::BufferUnderflow { .. })
        ));
    }

    #[test]
    fn read_array_negative_length() {
        let bytes = (-1i32).to_le_bytes();
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(
            reader.read_array_u32(),
            Err(CursorError::InvalidLength { length: -1 })
        );
    }

    #[test]
    fn read_array_huge_length_is_underflow() {
        let bytes = i32::MAX.to_le_bytes();
        let mut reader = ByteReader::new(&bytes);
        assert!(matches!(
            reader.read_array_i32_vector2(),
            Err(CursorError::BufferUnderflow { .. })
        ));
    }

    #[test]
    fn read_array_u8() {
        let mut reader = ByteReader::new(&[2, 9, 8, 7]);
        assert_eq!(reader.read_array_u8().unwrap(), vec![9, 8]);
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn read_compressed_garbage_fails() {
        let mut bytes = 3u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[1, 2, 3]);
        let mut reader = ByteReader::new(&bytes);
        assert!(matches!(
            reader.read_compressed_string(),
            Err(CursorError::Decompress { .. })
        ));
    }

    #[test]
    fn skip_and_read_bytes() {
        let mut reader = ByteReader::new(&[9, 1, 2, 3]);
        reader.skip(1).unwrap();
        assert_eq!(reader.read_bytes(2).unwrap(), &[1, 2]);
        assert!(reader.skip(2).is_err());
    }
}
