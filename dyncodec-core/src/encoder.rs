//! Growable output buffer used by the serializer.
//!
//! [`EncodeBuffer`] appends to a caller-owned `Vec<u8>`. Growth goes through
//! [`Vec::try_reserve`], which keeps the amortized (geometric) growth policy of
//! `Vec` while turning an allocation failure into
//! [`Error::AllocationFailure`] instead of an abort.

use crate::error::{Error, Result};

/// Width of every count prefix on the wire.
pub const COUNT_WIDTH: usize = 4;

/// Append-only writer over a caller-owned byte vector.
///
/// # Example
/// ```
/// use dyncodec_core::encoder::EncodeBuffer;
///
/// let mut out = Vec::new();
/// let mut encoder = EncodeBuffer::new(&mut out);
/// encoder.write_count(2, "s").unwrap();
/// encoder.write_bytes(b"hi").unwrap();
/// assert_eq!(encoder.bytes_written(), 6);
/// ```
#[derive(Debug)]
pub struct EncodeBuffer<'a> {
    buffer: &'a mut Vec<u8>,
    offset: usize,
}

impl<'a> EncodeBuffer<'a> {
    /// Creates an encoder that appends after the current contents of `buffer`.
    #[must_use]
    pub fn new(buffer: &'a mut Vec<u8>) -> Self {
        let offset = buffer.len();
        Self { buffer, offset }
    }

    /// Returns the length the buffer had when the encoder was created.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the current write position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.buffer.len()
    }

    /// Returns the number of bytes written by this encoder.
    #[must_use]
    pub fn bytes_written(&self) -> usize {
        self.buffer.len() - self.offset
    }

    /// Returns the bytes written by this encoder.
    #[must_use]
    pub fn written(&self) -> &[u8] {
        &self.buffer[self.offset..]
    }

    /// Ensures room for `additional` more bytes.
    ///
    /// # Errors
    /// Returns [`Error::AllocationFailure`] if the buffer cannot grow.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.buffer
            .try_reserve(additional)
            .map_err(|_| Error::AllocationFailure {
                requested: additional,
            })
    }

    /// Appends raw bytes.
    ///
    /// # Errors
    /// Returns [`Error::AllocationFailure`] if the buffer cannot grow.
    #[inline]
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.reserve(data.len())?;
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    /// Appends a single byte.
    ///
    /// # Errors
    /// Returns [`Error::AllocationFailure`] if the buffer cannot grow.
    #[inline]
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.reserve(1)?;
        self.buffer.push(value);
        Ok(())
    }

    /// Appends a 4-byte element count in native byte order.
    ///
    /// # Arguments
    /// * `count` - Element count to write
    /// * `field` - Field name, used in the error when the count does not fit
    ///
    /// # Errors
    /// Returns [`Error::ArrayBoundExceeded`] if `count` does not fit in 32
    /// bits, or [`Error::AllocationFailure`] if the buffer cannot grow.
    #[inline]
    pub fn write_count(&mut self, count: usize, field: &str) -> Result<()> {
        let count = u32::try_from(count)
            .map_err(|_| Error::bound_exceeded(field, count, u32::MAX as usize))?;
        self.write_bytes(&count.to_ne_bytes())
    }

    /// Appends 16-bit code units in native byte order.
    ///
    /// # Errors
    /// Returns [`Error::AllocationFailure`] if the buffer cannot grow.
    pub fn write_u16_units(&mut self, units: &[u16]) -> Result<()> {
        self.reserve(units.len().saturating_mul(2))?;
        for unit in units {
            self.buffer.extend_from_slice(&unit.to_ne_bytes());
        }
        Ok(())
    }

    /// Discards everything written by this encoder.
    pub fn rollback(&mut self) {
        self.buffer.truncate(self.offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_buffer_basic() {
        let mut out = Vec::new();
        let mut encoder = EncodeBuffer::new(&mut out);

        assert_eq!(encoder.offset(), 0);
        assert_eq!(encoder.position(), 0);
        assert_eq!(encoder.bytes_written(), 0);

        encoder.write_u8(0xFF).unwrap();
        assert_eq!(encoder.position(), 1);

        encoder.write_count(3, "a").unwrap();
        assert_eq!(encoder.position(), 5);

        encoder.write_bytes(&[1, 2, 3]).unwrap();
        assert_eq!(encoder.bytes_written(), 8);
        assert_eq!(&out[1..5], &3u32.to_ne_bytes());
    }

    #[test]
    fn test_encode_buffer_appends_after_existing() {
        let mut out = vec![0xAA, 0xBB];
        let mut encoder = EncodeBuffer::new(&mut out);

        assert_eq!(encoder.offset(), 2);
        encoder.write_bytes(b"Hello").unwrap();
        assert_eq!(encoder.bytes_written(), 5);
        assert_eq!(encoder.written(), b"Hello");
        assert_eq!(out, [0xAA, 0xBB, b'H', b'e', b'l', b'l', b'o']);
    }

    #[test]
    fn test_encode_buffer_rollback() {
        let mut out = vec![9];
        let mut encoder = EncodeBuffer::new(&mut out);
        encoder.write_bytes(&[1, 2, 3, 4]).unwrap();
        encoder.rollback();
        assert_eq!(encoder.bytes_written(), 0);
        assert_eq!(out, [9]);
    }

    #[test]
    fn test_encode_buffer_u16_units() {
        let mut out = Vec::new();
        let mut encoder = EncodeBuffer::new(&mut out);
        encoder.write_u16_units(&[0x0041, 0x00E9]).unwrap();
        let mut expected = Vec::new();
        expected.extend_from_slice(&0x0041u16.to_ne_bytes());
        expected.extend_from_slice(&0x00E9u16.to_ne_bytes());
        assert_eq!(out, expected);
    }

    #[test]
    fn test_encode_buffer_huge_reserve_fails() {
        let mut out = Vec::new();
        let mut encoder = EncodeBuffer::new(&mut out);
        let result = encoder.reserve(usize::MAX);
        assert!(matches!(result, Err(Error::AllocationFailure { .. })));
        assert_eq!(encoder.bytes_written(), 0);
    }
}
