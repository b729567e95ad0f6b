//! Archive sources and the pull-based ZIP reader.
//!
//! An [`ArchiveSource`] names where a ZIP archive lives: a file on disk or an
//! immutable in-memory buffer. Both can be opened any number of times, each
//! open producing an independent [`ArchiveReader`]. This is what lets the
//! pre-scan pass and the conversion pass each drive their own traversal.
//!
//! Non-rewindable byte streams are not a source kind of their own. They are
//! buffered first with [`ArchiveSource::from_reader`] or
//! [`ArchiveSource::from_async_reader`].

mod eocd;
mod reader;

pub use reader::ArchiveReader;

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use bytes::Bytes;
use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;

use crate::ConversionError;
use crate::Result;

/// Location of a ZIP archive.
///
/// # Examples
///
/// ```
/// use zip2tar_core::ArchiveSource;
///
/// let from_path = ArchiveSource::from("archive.zip");
/// assert!(matches!(from_path, ArchiveSource::Path(_)));
///
/// let from_bytes = ArchiveSource::from(vec![0x50, 0x4b, 0x05, 0x06]);
/// assert!(matches!(from_bytes, ArchiveSource::Buffer(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveSource {
    /// A ZIP file on the local filesystem.
    Path(PathBuf),

    /// A complete ZIP archive held in memory.
    Buffer(Bytes),
}

impl ArchiveSource {
    /// Buffers a whole byte stream into a source.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from `reader` fails.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Ok(Self::Buffer(Bytes::from(buffer)))
    }

    /// Buffers a whole asynchronous byte stream into a source.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from `reader` fails.
    pub async fn from_async_reader<R: AsyncRead + Unpin>(mut reader: R) -> Result<Self> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer).await?;
        Ok(Self::Buffer(Bytes::from(buffer)))
    }

    /// Rejects empty paths and empty buffers.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::SourceRequired`] when the source is empty.
    pub fn validate(&self) -> Result<()> {
        let empty = match self {
            Self::Path(path) => path.as_os_str().is_empty(),
            Self::Buffer(bytes) => bytes.is_empty(),
        };
        if empty {
            return Err(ConversionError::SourceRequired);
        }
        Ok(())
    }

    /// Returns the path when the source is a file.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Path(path) => Some(path),
            Self::Buffer(_) => None,
        }
    }

    /// Opens an independent reader over this source.
    ///
    /// # Errors
    ///
    /// See [`ArchiveReader::open`].
    pub fn open(&self) -> Result<ArchiveReader> {
        ArchiveReader::open(self)
    }
}

impl fmt::Display for ArchiveSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Buffer(bytes) => write!(f, "<buffer: {} bytes>", bytes.len()),
        }
    }
}

impl From<PathBuf> for ArchiveSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for ArchiveSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<&str> for ArchiveSource {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<String> for ArchiveSource {
    fn from(path: String) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<Vec<u8>> for ArchiveSource {
    fn from(buffer: Vec<u8>) -> Self {
        Self::Buffer(Bytes::from(buffer))
    }
}

impl From<&'static [u8]> for ArchiveSource {
    fn from(buffer: &'static [u8]) -> Self {
        Self::Buffer(Bytes::from_static(buffer))
    }
}

impl From<Bytes> for ArchiveSource {
    fn from(buffer: Bytes) -> Self {
        Self::Buffer(buffer)
    }
}
