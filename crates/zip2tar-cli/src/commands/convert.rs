//! ZIP to gzipped TAR conversion command.

use crate::error::convert_conversion_error;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Context;
use anyhow::Result;
use anyhow::anyhow;
use anyhow::bail;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::ffi::OsString;
use std::io;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::io::SyncIoBridge;
use zip2tar_core::ArchiveSource;
use zip2tar_core::ConversionError;
use zip2tar_core::ConversionReport;
use zip2tar_core::ConvertOptions;
use zip2tar_core::TarStream;

/// Settings shared by every conversion of one invocation.
#[derive(Debug, Clone, Copy)]
pub struct ConvertSettings {
    pub level: Compression,
    pub force: bool,
    pub progress: bool,
    pub verbose: bool,
}

/// Result of converting one archive.
#[derive(Debug, Serialize)]
pub struct ConversionSummary {
    pub source: String,
    pub destination: String,
    pub files: usize,
    pub directories: usize,
    pub content_bytes: u64,
    pub tar_bytes: u64,
    pub compressed_bytes: u64,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl ConversionSummary {
    fn new(source: &Path, destination: &Path, report: &ConversionReport, compressed_bytes: u64) -> Self {
        Self {
            source: source.display().to_string(),
            destination: destination.display().to_string(),
            files: report.files,
            directories: report.directories,
            content_bytes: report.content_bytes,
            tar_bytes: report.tar_bytes,
            compressed_bytes,
            duration: report.duration,
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_millis<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u128(duration.as_millis())
}

/// Returns the default destination for `input`: the first `.zip` in the
/// file name becomes `.tar.gz`, or `.tar.gz` is appended.
pub fn tar_path_for(input: &Path) -> PathBuf {
    let Some(name) = input.file_name() else {
        let mut path = input.as_os_str().to_owned();
        path.push(".tar.gz");
        return PathBuf::from(path);
    };

    let renamed = name.to_str().map_or_else(
        || {
            let mut name = name.to_owned();
            name.push(".tar.gz");
            name
        },
        |name| {
            if name.contains(".zip") {
                OsString::from(name.replacen(".zip", ".tar.gz", 1))
            } else {
                OsString::from(format!("{name}.tar.gz"))
            }
        },
    );
    input.with_file_name(renamed)
}

/// Converts every input in order, stopping at the first failure.
pub async fn execute(
    inputs: &[PathBuf],
    output: Option<&Path>,
    settings: ConvertSettings,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    if output.is_some() && inputs.len() > 1 {
        bail!(
            "--output can only be used with a single input archive\n\
             HINT: Omit --output to write each archive next to its source."
        );
    }

    let cwd = std::env::current_dir().context("failed to resolve the current directory")?;
    for input in inputs {
        let input = cwd.join(input);
        let destination = output.map_or_else(|| tar_path_for(&input), |o| cwd.join(o));
        let summary = convert_file(&input, &destination, settings).await?;
        formatter.format_conversion_result(&summary)?;
    }
    Ok(())
}

/// Converts one archive into a gzipped TAR file, removing the destination
/// if anything fails.
async fn convert_file(
    input: &Path,
    destination: &Path,
    settings: ConvertSettings,
) -> Result<ConversionSummary> {
    if !settings.force && destination.exists() {
        bail!(
            "Destination '{}' already exists\n\
             HINT: Use --force to overwrite it.",
            destination.display()
        );
    }

    let result = write_archive(input, destination, settings).await;
    if result.is_err() {
        if let Err(e) = tokio::fs::remove_file(destination).await {
            log::debug!("could not remove '{}': {e}", destination.display());
        }
    }
    result
}

async fn write_archive(
    input: &Path,
    destination: &Path,
    settings: ConvertSettings,
) -> Result<ConversionSummary> {
    let options = ConvertOptions::default().with_progress(settings.progress);
    let mut conversion = zip2tar_core::convert(input, options)
        .map_err(|e| convert_conversion_error(e, input))?;
    let stream = conversion
        .take_stream()
        .ok_or_else(|| anyhow!("TAR stream already taken"))?;

    let file = tokio::fs::File::create(destination)
        .await
        .with_context(|| format!("failed to create '{}'", destination.display()))?
        .into_std()
        .await;
    let writer = spawn_gzip_writer(stream, BufWriter::new(file), settings.level);

    let progress = settings.progress.then(|| {
        let name = input
            .file_name()
            .map_or_else(|| input.display().to_string(), |n| n.to_string_lossy().into_owned());
        CliProgress::new(&name, settings.verbose)
    });
    while let Some(event) = conversion.next_event().await {
        if let Some(progress) = &progress {
            progress.on_event(&event);
        }
    }
    drop(progress);

    let outcome = conversion.finish().await;
    let written = writer.await.context("gzip writer task failed")?;

    match (outcome, written) {
        (Ok(report), Ok(file)) => {
            let compressed = file
                .into_inner()
                .map_err(io::IntoInnerError::into_error)
                .and_then(|file| file.metadata())
                .map(|metadata| metadata.len())
                .with_context(|| format!("failed to finish '{}'", destination.display()))?;
            log::debug!(
                "wrote '{}' ({} TAR bytes, {compressed} compressed)",
                destination.display(),
                report.tar_bytes
            );
            Ok(ConversionSummary::new(input, destination, &report, compressed))
        }
        (Ok(_) | Err(ConversionError::OutputClosed), Err(e)) => {
            Err(anyhow::Error::from(e).context(format!("failed to write '{}'", destination.display())))
        }
        (Err(e), _) => Err(convert_conversion_error(e, input)),
    }
}

/// Copies the TAR stream through a gzip encoder into `sink` on the
/// blocking pool and returns the sink once the gzip trailer is written.
fn spawn_gzip_writer<W>(
    stream: TarStream,
    sink: W,
    level: Compression,
) -> tokio::task::JoinHandle<io::Result<W>>
where
    W: Write + Send + 'static,
{
    let mut reader = SyncIoBridge::new(stream);
    tokio::task::spawn_blocking(move || {
        let mut encoder = GzEncoder::new(sink, level);
        io::copy(&mut reader, &mut encoder)?;
        let mut sink = encoder.finish()?;
        sink.flush()?;
        Ok(sink)
    })
}

/// Reads a whole archive from stdin and writes the gzipped TAR to stdout.
pub async fn execute_stdin(settings: ConvertSettings) -> Result<()> {
    let stdin = Path::new("<stdin>");
    let source = ArchiveSource::from_async_reader(tokio::io::stdin())
        .await
        .context("failed to read archive from stdin")?;

    let mut conversion = zip2tar_core::convert(source, ConvertOptions::default())
        .map_err(|e| convert_conversion_error(e, stdin))?;
    let stream = conversion
        .take_stream()
        .ok_or_else(|| anyhow!("TAR stream already taken"))?;
    let writer = spawn_gzip_writer(stream, io::stdout(), settings.level);

    let outcome = conversion.finish().await;
    let written = writer.await.context("gzip writer task failed")?;

    match (outcome, written) {
        (Ok(report), Ok(_)) => {
            log::debug!(
                "converted stdin: {} entries, {} TAR bytes",
                report.entries(),
                report.tar_bytes
            );
            Ok(())
        }
        (Ok(_) | Err(ConversionError::OutputClosed), Err(e)) => {
            Err(anyhow::Error::from(e).context("failed to write to stdout"))
        }
        (Err(e), _) => Err(convert_conversion_error(e, stdin)),
    }
}
