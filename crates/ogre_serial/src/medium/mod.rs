//! Byte sinks and sources a [`Serializer`](crate::Serializer) runs on.
//!
//! - [`MemoryMedium`]: a growable buffer with a read cursor. Writes append,
//!   reads consume from the front, so one buffer can be saved into and
//!   loaded back from by the same serializer.
//! - [`FileMedium`]: a buffered file, opened either for writing or reading.
//!
//! Both cursors only move forward; no medium is ever asked to seek.

// -----------------------------------------------------------------------------
// Modules

mod file;
mod memory;

// -----------------------------------------------------------------------------
// Exports

pub use file::FileMedium;
pub use memory::MemoryMedium;

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::error::Result;

// -----------------------------------------------------------------------------
// Medium

/// A sequential byte sink and source.
///
/// Implementations report a short read as
/// [`CorruptData`](crate::SerialError::CorruptData): from the engine's point
/// of view a stream that ends early is a truncated stream.
pub trait Medium {
    /// Appends `bytes`.
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

    /// Fills `buf` with the next `buf.len()` bytes.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Number of bytes consumed by reads so far.
    fn read_position(&self) -> u64;

    /// Number of bytes written so far.
    fn write_position(&self) -> u64;

    /// Bytes left to read, if the medium knows.
    fn remaining(&self) -> Option<u64>;

    /// Pushes buffered writes to the backing store.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// The whole written content, for in-memory media.
    fn buffer(&self) -> Option<&[u8]> {
        None
    }

    /// Consumes the medium, returning its content for in-memory media.
    fn into_buffer(self: Box<Self>) -> Option<Vec<u8>> {
        None
    }
}
