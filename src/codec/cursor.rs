//! Checked read cursor over a framed byte range.
//!
//! Decoding assumes the complete byte range for one value is already
//! available: the outer transport layer establishes framing boundaries
//! before the codec is invoked. A short read here therefore means the
//! framing itself is corrupt, and every getter fails with a fatal
//! framing error instead of waiting for more input.
//!
//! # Example
//!
//! ```
//! use amqwire::codec::Cursor;
//!
//! let mut cur = Cursor::new(&[0x01, 0x02]);
//! assert_eq!(cur.try_get_u16("ticket").unwrap(), 0x0102);
//! assert!(cur.try_get_u8("bitfield").is_err());
//! ```

use bytes::Bytes;

use crate::error::{CodecError, Result};

/// Non-recovering cursor over a byte range.
#[derive(Debug)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor over `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not yet consumed.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Whether every byte has been consumed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Consume `n` bytes, failing with a framing error when fewer
    /// remain. `what` names the type being decoded in the error.
    pub fn try_get_slice(&mut self, n: usize, what: &str) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(CodecError::framing(format!(
                "cannot decode {what}: insufficient input data (need {n} bytes, have {})",
                self.remaining()
            )));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Consume `n` bytes into an owned buffer.
    pub fn try_get_bytes(&mut self, n: usize, what: &str) -> Result<Bytes> {
        self.try_get_slice(n, what)
            .map(Bytes::copy_from_slice)
    }

    /// Consume one byte.
    pub fn try_get_u8(&mut self, what: &str) -> Result<u8> {
        let b = self.try_get_slice(1, what)?;
        Ok(b[0])
    }

    /// Consume a big-endian u16.
    pub fn try_get_u16(&mut self, what: &str) -> Result<u16> {
        let b = self.try_get_slice(2, what)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    /// Consume a big-endian u32.
    pub fn try_get_u32(&mut self, what: &str) -> Result<u32> {
        let b = self.try_get_slice(4, what)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Consume a big-endian u64.
    pub fn try_get_u64(&mut self, what: &str) -> Result<u64> {
        let b = self.try_get_slice(8, what)?;
        Ok(u64::from_be_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// Consume a signed byte.
    pub fn try_get_i8(&mut self, what: &str) -> Result<i8> {
        Ok(self.try_get_u8(what)? as i8)
    }

    /// Consume a big-endian i16.
    pub fn try_get_i16(&mut self, what: &str) -> Result<i16> {
        Ok(self.try_get_u16(what)? as i16)
    }

    /// Consume a big-endian i32.
    pub fn try_get_i32(&mut self, what: &str) -> Result<i32> {
        Ok(self.try_get_u32(what)? as i32)
    }

    /// Consume a big-endian i64.
    pub fn try_get_i64(&mut self, what: &str) -> Result<i64> {
        Ok(self.try_get_u64(what)? as i64)
    }

    /// Consume a big-endian f32.
    pub fn try_get_f32(&mut self, what: &str) -> Result<f32> {
        Ok(f32::from_bits(self.try_get_u32(what)?))
    }

    /// Consume a big-endian f64.
    pub fn try_get_f64(&mut self, what: &str) -> Result<f64> {
        Ok(f64::from_bits(self.try_get_u64(what)?))
    }

    /// Consume `n` bytes as UTF-8.
    pub fn try_get_str(&mut self, n: usize, what: &str) -> Result<&'a str> {
        let slice = self.try_get_slice(n, what)?;
        std::str::from_utf8(slice)
            .map_err(|_| CodecError::framing(format!("cannot decode {what}: invalid utf-8")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCondition;

    #[test]
    fn test_sequential_reads_consume_exactly() {
        let mut cur = Cursor::new(&[0x01, 0x02, 0x03, 0x04, 0x05]);
        assert_eq!(cur.try_get_u8("a").unwrap(), 0x01);
        assert_eq!(cur.try_get_u16("b").unwrap(), 0x0203);
        assert_eq!(cur.remaining(), 2);
        assert_eq!(cur.try_get_slice(2, "c").unwrap(), &[0x04, 0x05]);
        assert!(cur.is_empty());
    }

    #[test]
    fn test_underflow_is_framing_error() {
        let mut cur = Cursor::new(&[0x01]);
        let err = cur.try_get_u32("length prefix").unwrap_err();
        assert_eq!(err.condition, ErrorCondition::FramingError);
        assert!(err.description.contains("length prefix"));
        assert!(err.description.contains("need 4"));
    }

    #[test]
    fn test_underflow_does_not_consume() {
        let mut cur = Cursor::new(&[0x01, 0x02]);
        assert!(cur.try_get_u32("x").is_err());
        // A failed read leaves the cursor untouched; the caller tears
        // down the connection rather than resuming.
        assert_eq!(cur.remaining(), 2);
    }

    #[test]
    fn test_invalid_utf8_is_framing_error() {
        let mut cur = Cursor::new(&[0xFF, 0xFE]);
        let err = cur.try_get_str(2, "string").unwrap_err();
        assert_eq!(err.condition, ErrorCondition::FramingError);
        assert!(err.description.contains("utf-8"));
    }

    #[test]
    fn test_get_bytes_copies() {
        let data = vec![1u8, 2, 3];
        let mut cur = Cursor::new(&data);
        let got = cur.try_get_bytes(3, "binary").unwrap();
        assert_eq!(&got[..], &[1, 2, 3]);
    }
}
