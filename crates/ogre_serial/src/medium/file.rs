use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, SerialError};
use crate::medium::Medium;

enum Mode {
    Writer { file: BufWriter<File>, written: u64 },
    Reader { file: BufReader<File>, read: u64, len: u64 },
}

/// A buffered file medium.
///
/// A file is either being written ([`create`](Self::create)) or being read
/// ([`open`](Self::open)); the other direction fails with
/// [`ErrorKind::Unsupported`]. Buffered writes are flushed on
/// [`flush`](Medium::flush) and, ignoring errors, on drop.
pub struct FileMedium {
    path: PathBuf,
    mode: Mode,
}

impl FileMedium {
    /// Creates or truncates `path` for writing.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self {
            path,
            mode: Mode::Writer {
                file: BufWriter::new(file),
                written: 0,
            },
        })
    }

    /// Opens `path` for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            path,
            mode: Mode::Reader {
                file: BufReader::new(file),
                read: 0,
                len,
            },
        })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn wrong_direction(&self, op: &str) -> SerialError {
        SerialError::Io(io::Error::new(
            ErrorKind::Unsupported,
            format!("cannot {op} `{}`: wrong open mode", self.path.display()),
        ))
    }
}

impl Medium for FileMedium {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        match &mut self.mode {
            Mode::Writer { file, written } => {
                file.write_all(bytes)?;
                *written += bytes.len() as u64;
                Ok(())
            }
            Mode::Reader { .. } => Err(self.wrong_direction("write to")),
        }
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        match &mut self.mode {
            Mode::Reader { file, read, len } => {
                let left = *len - *read;
                if buf.len() as u64 > left {
                    return Err(SerialError::corrupt(
                        *read,
                        format!(
                            "unexpected end of file: {} bytes requested, {left} left",
                            buf.len()
                        ),
                    ));
                }
                match file.read_exact(buf) {
                    Ok(()) => {
                        *read += buf.len() as u64;
                        Ok(())
                    }
                    Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                        Err(SerialError::corrupt(*read, "file shrank while reading"))
                    }
                    Err(e) => Err(e.into()),
                }
            }
            Mode::Writer { .. } => Err(self.wrong_direction("read from")),
        }
    }

    fn read_position(&self) -> u64 {
        match self.mode {
            Mode::Reader { read, .. } => read,
            Mode::Writer { .. } => 0,
        }
    }

    fn write_position(&self) -> u64 {
        match self.mode {
            Mode::Writer { written, .. } => written,
            Mode::Reader { .. } => 0,
        }
    }

    fn remaining(&self) -> Option<u64> {
        match self.mode {
            Mode::Reader { read, len, .. } => Some(len - read),
            Mode::Writer { .. } => Some(0),
        }
    }

    fn flush(&mut self) -> Result<()> {
        if let Mode::Writer { file, .. } = &mut self.mode {
            file.flush()?;
        }
        Ok(())
    }
}

impl core::fmt::Debug for FileMedium {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mode = match self.mode {
            Mode::Writer { .. } => "write",
            Mode::Reader { .. } => "read",
        };
        f.debug_struct("FileMedium")
            .field("path", &self.path)
            .field("mode", &mode)
            .finish()
    }
}
