//! Errors returned by the walker and the two public operations.
use std::io;
use std::path::PathBuf;

/// Result type shorthand.
pub type Result<T = (), E = Error> = std::result::Result<T, E>;

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The path doesn't exist or couldn't be opened for reading.
    #[error("couldn't open {}: {source}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Bad magic, unsupported class, or an offset/size that runs past the file.
    #[error("malformed ELF file: {0}")]
    Format(String),

    /// The mode selector isn't one of the documented symbol levels.
    #[error("unsupported symbol level {0} (expected 0, 1, or 2)")]
    InvalidArgument(i32),

    /// The file was opened but couldn't be mapped.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub fn format(mesg: impl Into<String>) -> Self {
        Error::Format(mesg.into())
    }

    /// A read of `size` bytes at `offset` doesn't fit within a file of `len` bytes.
    pub fn out_of_bounds(what: &str, offset: u64, size: u64, len: usize) -> Self {
        Error::Format(format!(
            "{what} at offset 0x{offset:x} (0x{size:x} bytes) extends past end of file (0x{len:x} bytes)"
        ))
    }

    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format(_))
    }
}
