//! Bounds-checked input cursor used by the deserializer.
//!
//! The length of the input slice is the only trusted bound. Every read is
//! checked against the remaining bytes before anything is consumed, so a
//! short or corrupt buffer yields [`Error::TruncatedInput`] and never an
//! out-of-bounds access.

use crate::encoder::COUNT_WIDTH;
use crate::error::{Error, Result};

/// Forward-only reader over an untrusted byte slice.
#[derive(Debug, Clone)]
pub struct ReadCursor<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ReadCursor<'a> {
    /// Wraps a byte slice for decoding.
    #[must_use]
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Returns the current read position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns the number of bytes not yet consumed.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    /// Returns true if the whole input has been consumed.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Checks that `required` bytes are available without consuming them.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedInput`] if fewer bytes remain.
    #[inline]
    pub fn ensure(&self, required: usize) -> Result<()> {
        if required > self.remaining() {
            return Err(Error::TruncatedInput {
                offset: self.position,
                required,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    /// Consumes and returns the next `len` bytes.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedInput`] if fewer than `len` bytes remain.
    #[inline]
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        self.ensure(len)?;
        let start = self.position;
        self.position += len;
        Ok(&self.buffer[start..self.position])
    }

    /// Consumes `count` elements of `width` bytes each.
    ///
    /// The multiplication is checked; an overflowing product is reported as
    /// truncated input since no real buffer can hold it.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedInput`] if the elements do not fit.
    #[inline]
    pub fn take_elements(&mut self, count: usize, width: usize) -> Result<&'a [u8]> {
        let len = count.checked_mul(width).ok_or(Error::TruncatedInput {
            offset: self.position,
            required: usize::MAX,
            remaining: self.remaining(),
        })?;
        self.take(len)
    }

    /// Reads a 4-byte element count in native byte order.
    ///
    /// The returned value is peer-controlled and must be validated before it
    /// is used as an allocation size or loop bound.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedInput`] if fewer than 4 bytes remain.
    #[inline]
    pub fn read_count(&mut self) -> Result<usize> {
        let bytes = self.take(COUNT_WIDTH)?;
        let mut raw = [0u8; COUNT_WIDTH];
        raw.copy_from_slice(bytes);
        Ok(u32::from_ne_bytes(raw) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_take() {
        let data = [1u8, 2, 3, 4, 5];
        let mut cursor = ReadCursor::new(&data);

        assert_eq!(cursor.take(2).unwrap(), &[1, 2]);
        assert_eq!(cursor.position(), 2);
        assert_eq!(cursor.remaining(), 3);
        assert_eq!(cursor.take(3).unwrap(), &[3, 4, 5]);
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_cursor_take_past_end_consumes_nothing() {
        let data = [1u8, 2, 3];
        let mut cursor = ReadCursor::new(&data);
        cursor.take(1).unwrap();

        let result = cursor.take(3);
        assert_eq!(
            result,
            Err(Error::TruncatedInput {
                offset: 1,
                required: 3,
                remaining: 2,
            })
        );
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_cursor_read_count() {
        let mut data = Vec::new();
        data.extend_from_slice(&7u32.to_ne_bytes());
        let mut cursor = ReadCursor::new(&data);
        assert_eq!(cursor.read_count().unwrap(), 7);
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_cursor_read_count_truncated() {
        let data = [0u8; 3];
        let mut cursor = ReadCursor::new(&data);
        assert!(matches!(
            cursor.read_count(),
            Err(Error::TruncatedInput { required: 4, .. })
        ));
    }

    #[test]
    fn test_cursor_take_elements_overflow() {
        let data = [0u8; 16];
        let mut cursor = ReadCursor::new(&data);
        let result = cursor.take_elements(usize::MAX, 8);
        assert!(matches!(result, Err(Error::TruncatedInput { .. })));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_cursor_take_elements() {
        let data = [0u8; 16];
        let mut cursor = ReadCursor::new(&data);
        assert_eq!(cursor.take_elements(3, 4).unwrap().len(), 12);
        assert!(cursor.take_elements(1, 8).is_err());
    }
}
