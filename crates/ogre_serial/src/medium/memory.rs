use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::error::{Result, SerialError};
use crate::medium::Medium;

/// An in-memory medium.
///
/// # Examples
///
/// ```
/// use ogre_serial::medium::{Medium, MemoryMedium};
///
/// let mut medium = MemoryMedium::new();
/// medium.write_all(b"abc").unwrap();
///
/// let mut buf = [0; 2];
/// medium.read_exact(&mut buf).unwrap();
/// assert_eq!(&buf, b"ab");
/// assert_eq!(medium.remaining(), Some(1));
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryMedium {
    data: Vec<u8>,
    cursor: usize,
}

impl MemoryMedium {
    #[inline]
    pub const fn new() -> Self {
        Self {
            data: Vec::new(),
            cursor: 0,
        }
    }

    /// Wraps received bytes for reading.
    #[inline]
    pub const fn from_bytes(data: Vec<u8>) -> Self {
        Self { data, cursor: 0 }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl Medium for MemoryMedium {
    #[inline]
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let end = self.cursor + buf.len();
        match self.data.get(self.cursor..end) {
            Some(src) => {
                buf.copy_from_slice(src);
                self.cursor = end;
                Ok(())
            }
            None => Err(SerialError::corrupt(
                self.read_position(),
                alloc::format!(
                    "unexpected end of stream: {} bytes requested, {} left",
                    buf.len(),
                    self.data.len() - self.cursor
                ),
            )),
        }
    }

    #[inline]
    fn read_position(&self) -> u64 {
        self.cursor as u64
    }

    #[inline]
    fn write_position(&self) -> u64 {
        self.data.len() as u64
    }

    #[inline]
    fn remaining(&self) -> Option<u64> {
        Some((self.data.len() - self.cursor) as u64)
    }

    #[inline]
    fn buffer(&self) -> Option<&[u8]> {
        Some(&self.data)
    }

    #[inline]
    fn into_buffer(self: Box<Self>) -> Option<Vec<u8>> {
        Some(self.data)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::MemoryMedium;
    use crate::SerialError;
    use crate::medium::Medium;

    #[test]
    fn short_read_is_corrupt() {
        let mut medium = MemoryMedium::from_bytes(vec![1, 2, 3]);
        let mut buf = [0; 4];
        let err = medium.read_exact(&mut buf).unwrap_err();
        assert!(matches!(err, SerialError::CorruptData { position: 0, .. }));
        // A failed read consumes nothing.
        assert_eq!(medium.remaining(), Some(3));
    }

    #[test]
    fn writes_do_not_move_read_cursor() {
        let mut medium = MemoryMedium::new();
        medium.write_all(&[7, 8]).unwrap();
        let mut one = [0; 1];
        medium.read_exact(&mut one).unwrap();
        medium.write_all(&[9]).unwrap();

        assert_eq!(medium.read_position(), 1);
        assert_eq!(medium.write_position(), 3);
        assert_eq!(medium.as_bytes(), &[7, 8, 9]);
    }
}
