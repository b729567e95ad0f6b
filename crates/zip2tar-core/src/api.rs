//! High-level public API for ZIP to TAR conversion.

use crate::ArchiveSource;
use crate::Conversion;
use crate::ConversionError;
use crate::ConvertOptions;
use crate::Result;
use crate::conversion;

/// Starts converting a ZIP archive into a TAR stream.
///
/// The source is either a filesystem path or an in-memory buffer; anything
/// convertible into an [`ArchiveSource`] is accepted. The conversion runs
/// on the current tokio runtime and this function returns immediately.
///
/// Entries are emitted in central directory order. Every TAR header is
/// deterministic: mode from the ZIP entry or a 0o644/0o755 default, mtime
/// from the ZIP entry or 0, uid and gid 0.
///
/// # Errors
///
/// Fails synchronously, before anything is spawned, if:
/// - the source is an empty path or an empty buffer
///   ([`ConversionError::SourceRequired`])
/// - no tokio runtime is running ([`ConversionError::RuntimeUnavailable`])
///
/// Every other failure is reported by [`Conversion::finish`].
///
/// # Examples
///
/// ```no_run
/// use zip2tar_core::ConversionEvent;
/// use zip2tar_core::ConvertOptions;
/// use zip2tar_core::convert;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut conversion = convert("archive.zip", ConvertOptions::default().with_progress(true))?;
/// let stream = conversion.take_stream().ok_or("stream already taken")?;
/// let writer = tokio::spawn(stream.read_all());
///
/// while let Some(event) = conversion.next_event().await {
///     if let ConversionEvent::Progress(percent) = event {
///         println!("{percent}%");
///     }
/// }
///
/// let report = conversion.finish().await?;
/// let tar = writer.await??;
/// assert_eq!(tar.len() as u64, report.tar_bytes);
/// # Ok(())
/// # }
/// ```
pub fn convert(source: impl Into<ArchiveSource>, options: ConvertOptions) -> Result<Conversion> {
    conversion::spawn(source.into(), options)
}

/// Converts a ZIP archive and collects the whole TAR output in memory.
///
/// # Errors
///
/// Returns the same errors as [`convert`] and [`Conversion::finish`]. When
/// the conversion fails the partial output is discarded.
///
/// # Examples
///
/// ```
/// use zip2tar_core::ConvertOptions;
/// use zip2tar_core::convert_to_vec;
/// use zip2tar_core::test_utils::create_test_zip;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> zip2tar_core::Result<()> {
/// let zip = create_test_zip(vec![("hello.txt", b"hello")]);
/// let tar = convert_to_vec(zip, ConvertOptions::default()).await?;
/// // one header, one padded content block, two trailer blocks
/// assert_eq!(tar.len(), 4 * 512);
/// # Ok(())
/// # }
/// ```
pub async fn convert_to_vec(
    source: impl Into<ArchiveSource>,
    options: ConvertOptions,
) -> Result<Vec<u8>> {
    let (stream, _, completion) = conversion::start(source.into(), options)?;
    let (bytes, outcome) = tokio::join!(stream.read_all(), completion.wait());

    // The stream only carries a copy of the failure; prefer the typed one.
    outcome?;
    bytes.map_err(ConversionError::Io)
}
