//! Streaming ZIP to TAR conversion.
//!
//! `zip2tar-core` reads a ZIP archive from a path or an in-memory buffer and
//! emits an equivalent uncompressed TAR archive as an async byte stream.
//! Entry contents are copied one at a time with bounded buffering, so the
//! memory used does not grow with the archive. While converting, a
//! [`Conversion`] reports every written entry name and, when requested, an
//! integer percentage of entries written.
//!
//! # Examples
//!
//! ```no_run
//! use zip2tar_core::ConvertOptions;
//! use zip2tar_core::convert_to_vec;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tar = convert_to_vec("archive.zip", ConvertOptions::default()).await?;
//! std::fs::write("archive.tar", tar)?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
mod conversion;
pub mod error;
pub mod event;
pub mod io;
pub mod progress;
pub mod report;
pub mod scan;
pub mod source;
pub mod stream;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
#[doc(hidden)]
pub mod test_utils;

pub use api::convert;
pub use api::convert_to_vec;
pub use config::ConvertOptions;
pub use conversion::Completion;
pub use conversion::Conversion;
pub use error::ConversionError;
pub use error::Result;
pub use event::ConversionEvent;
pub use event::Events;
pub use progress::ProgressTracker;
pub use report::ConversionReport;
pub use source::ArchiveReader;
pub use source::ArchiveSource;
pub use stream::TarStream;
pub use types::ArchiveEntry;
pub use types::EntryType;
