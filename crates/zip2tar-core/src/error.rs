//! Error types for ZIP to TAR conversion.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ConversionError`.
pub type Result<T> = std::result::Result<T, ConversionError>;

/// Errors that can occur while converting a ZIP archive into a TAR stream.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The archive source is an empty path or an empty buffer.
    #[error("source required")]
    SourceRequired,

    /// `convert` was called outside of a tokio runtime.
    #[error("conversion requires a running tokio runtime")]
    RuntimeUnavailable,

    /// The archive file does not exist.
    #[error("archive not found: {}", path.display())]
    NotFound {
        /// The path that was opened.
        path: PathBuf,
    },

    /// The input has no ZIP end of central directory record.
    #[error("end of central directory record signature not found")]
    MissingEndOfCentralDirectory,

    /// The ZIP structure is corrupt or unsupported.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// Reading the content of an entry failed.
    #[error("failed to read entry '{name}': {source}")]
    EntryRead {
        /// Entry name as stored in the ZIP.
        name: String,
        /// Underlying I/O or decompression error.
        source: std::io::Error,
    },

    /// An entry produced a different number of bytes than its header declared.
    #[error("entry '{name}' declared {expected} bytes but produced {actual}")]
    SizeMismatch {
        /// Entry name as stored in the ZIP.
        name: String,
        /// Uncompressed size from the central directory.
        expected: u64,
        /// Bytes actually produced by the content stream.
        actual: u64,
    },

    /// Writing an entry into the TAR output failed.
    #[error("failed to write TAR entry '{name}': {source}")]
    EntryWrite {
        /// Entry name as stored in the ZIP.
        name: String,
        /// Underlying error from the TAR writer.
        source: std::io::Error,
    },

    /// The consumer dropped the TAR output stream.
    #[error("TAR output stream closed before conversion finished")]
    OutputClosed,

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The background conversion task panicked or was cancelled.
    #[error("conversion task interrupted: {0}")]
    Interrupted(String),
}

impl ConversionError {
    /// Returns `true` for errors raised synchronously by `convert`, before
    /// any I/O takes place.
    ///
    /// # Examples
    ///
    /// ```
    /// use zip2tar_core::ConversionError;
    ///
    /// assert!(ConversionError::SourceRequired.is_validation_error());
    /// assert!(!ConversionError::OutputClosed.is_validation_error());
    /// ```
    #[must_use]
    pub const fn is_validation_error(&self) -> bool {
        matches!(self, Self::SourceRequired | Self::RuntimeUnavailable)
    }

    /// Returns `true` if the archive file was absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Io(err) => err.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Returns the name of the entry being processed when the error occurred.
    ///
    /// # Examples
    ///
    /// ```
    /// use zip2tar_core::ConversionError;
    ///
    /// let err = ConversionError::SizeMismatch {
    ///     name: "a.txt".into(),
    ///     expected: 4,
    ///     actual: 2,
    /// };
    /// assert_eq!(err.entry_name(), Some("a.txt"));
    /// assert_eq!(ConversionError::OutputClosed.entry_name(), None);
    /// ```
    #[must_use]
    pub fn entry_name(&self) -> Option<&str> {
        match self {
            Self::EntryRead { name, .. }
            | Self::SizeMismatch { name, .. }
            | Self::EntryWrite { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Maps an error from the `zip` crate raised while opening or walking
    /// the central directory.
    pub(crate) fn from_zip(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io_err) => Self::Io(io_err),
            other => Self::InvalidArchive(other.to_string()),
        }
    }
}
