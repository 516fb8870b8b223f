//! Little-endian read/write primitives over byte buffers
//!
//! Strings on the wire are an `i32` byte length followed by that many bytes,
//! with no terminator.

use crate::error::{FormatError, Result};

/// Read cursor with an explicit, resettable position
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move to an absolute offset. Seeking past the end is allowed; the next
    /// read reports the overrun.
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(FormatError::UnexpectedEof {
                offset: self.pos,
                needed: len,
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.take_array()?))
    }

    /// Borrow the next `len` bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.take(len)
    }

    /// Advance `len` bytes, failing if that would pass the end
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    /// Check a 4-byte magic at the current position
    pub fn expect_magic(&mut self, expected: &[u8; 4]) -> Result<()> {
        let found = self.take_array::<4>()?;
        if &found != expected {
            return Err(FormatError::InvalidMagic {
                expected: *expected,
                found,
            });
        }
        Ok(())
    }

    fn read_string_len(&mut self) -> Result<usize> {
        let offset = self.pos;
        let length = self.read_i32()?;
        usize::try_from(length).map_err(|_| FormatError::InvalidLength { offset, length })
    }

    /// Read an `i32`-length-prefixed string. Invalid UTF-8 is replaced, not rejected.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_string_len()?;
        Ok(String::from_utf8_lossy(self.take(len)?).into_owned())
    }

    /// Skip an `i32`-length-prefixed string
    pub fn skip_string(&mut self) -> Result<()> {
        let len = self.read_string_len()?;
        self.skip(len)
    }
}

/// Growable little-endian writer
#[derive(Debug, Clone, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Write a collection length as `u32`
    pub fn write_count(&mut self, what: &'static str, count: usize) -> Result<()> {
        let value =
            u32::try_from(count).map_err(|_| FormatError::CountOverflow { what, count })?;
        self.write_u32(value);
        Ok(())
    }

    /// Write an `i32`-length-prefixed string
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        let len = i32::try_from(value.len()).map_err(|_| FormatError::CountOverflow {
            what: "string byte",
            count: value.len(),
        })?;
        self.write_i32(len);
        self.write_bytes(value.as_bytes());
        Ok(())
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitives() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x1234_5678u32.to_le_bytes());
        data.extend_from_slice(&(-5i32).to_le_bytes());
        data.extend_from_slice(&1.5f32.to_le_bytes());
        data.push(0xAB);
        data.extend_from_slice(&0xBEEFu16.to_le_bytes());

        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_u32().unwrap(), 0x1234_5678);
        assert_eq!(cursor.read_i32().unwrap(), -5);
        assert_eq!(cursor.read_f32().unwrap(), 1.5);
        assert_eq!(cursor.read_u8().unwrap(), 0xAB);
        assert_eq!(cursor.read_u16().unwrap(), 0xBEEF);
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_eof_reports_offset() {
        let mut cursor = ByteCursor::new(&[1, 2, 3]);
        cursor.skip(1).unwrap();
        assert!(matches!(
            cursor.read_u32(),
            Err(FormatError::UnexpectedEof {
                offset: 1,
                needed: 4
            })
        ));
    }

    #[test]
    fn test_string_round_trip_and_skip() {
        let mut writer = ByteWriter::new();
        writer.write_string("hello").unwrap();
        writer.write_string("").unwrap();
        writer.write_u8(7);
        let data = writer.into_inner();
        assert_eq!(&data[..4], &5i32.to_le_bytes());

        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_string().unwrap(), "hello");
        assert_eq!(cursor.read_string().unwrap(), "");
        assert_eq!(cursor.read_u8().unwrap(), 7);

        cursor.set_position(0);
        cursor.skip_string().unwrap();
        assert_eq!(cursor.position(), 9);
    }

    #[test]
    fn test_negative_string_length() {
        let data = (-1i32).to_le_bytes();
        let mut cursor = ByteCursor::new(&data);
        assert!(matches!(
            cursor.read_string(),
            Err(FormatError::InvalidLength {
                offset: 0,
                length: -1
            })
        ));
    }

    #[test]
    fn test_string_longer_than_buffer() {
        let mut data = 100i32.to_le_bytes().to_vec();
        data.extend_from_slice(b"short");
        let mut cursor = ByteCursor::new(&data);
        assert!(matches!(
            cursor.read_string(),
            Err(FormatError::UnexpectedEof { offset: 4, needed: 100 })
        ));
    }

    #[test]
    fn test_expect_magic() {
        let mut cursor = ByteCursor::new(b"ANIM");
        assert!(cursor.expect_magic(b"ANIM").is_ok());

        let mut cursor = ByteCursor::new(b"BILD");
        assert!(matches!(
            cursor.expect_magic(b"ANIM"),
            Err(FormatError::InvalidMagic { found, .. }) if &found == b"BILD"
        ));
    }
}
