//! Error conversion utilities for CLI.
//!
//! Converts zip2tar-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use std::path::Path;
use zip2tar_core::ConversionError;

/// Converts `ConversionError` to user-friendly anyhow error with context
pub fn convert_conversion_error(err: ConversionError, archive: &Path) -> anyhow::Error {
    match err {
        ConversionError::SourceRequired => {
            anyhow!(
                "No archive data in '{}'\n\
                 HINT: Pass a ZIP file path, or pipe a ZIP archive into stdin.",
                archive.display()
            )
        }
        ConversionError::NotFound { path } => {
            anyhow!(
                "Archive not found: {}\n\
                 HINT: Check the path; relative paths resolve against the current directory.",
                path.display()
            )
        }
        ConversionError::MissingEndOfCentralDirectory => {
            anyhow!(
                "'{}' is not a ZIP archive: end of central directory record signature not found\n\
                 HINT: The file may be truncated or in another format.",
                archive.display()
            )
        }
        ConversionError::InvalidArchive(reason) => {
            anyhow!(
                "Invalid archive '{}': {}\n\
                 HINT: The archive may be corrupted or malformed.",
                archive.display(),
                reason
            )
        }
        ConversionError::EntryRead { name, source } => {
            anyhow!(
                "Failed to read '{}' from '{}': {}\n\
                 HINT: The entry data is corrupted or uses an unsupported compression method.",
                name,
                archive.display(),
                source
            )
        }
        ConversionError::EntryWrite { name, source } => {
            anyhow!(
                "Entry '{}' in '{}' cannot be stored in a TAR archive: {}\n\
                 HINT: TAR entry names must be relative and must not contain '..'.",
                name,
                archive.display(),
                source
            )
        }
        ConversionError::Io(io_err) => {
            anyhow!(
                "I/O error while processing '{}': {}",
                archive.display(),
                io_err
            )
        }
        _ => anyhow::Error::from(err)
            .context(format!("Error converting archive '{}'", archive.display())),
    }
}
