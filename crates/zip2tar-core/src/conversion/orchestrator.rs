//! The blocking conversion pass.

use std::io::Write;

use crate::ArchiveEntry;
use crate::ArchiveReader;
use crate::ArchiveSource;
use crate::ConversionError;
use crate::ConversionReport;
use crate::ProgressTracker;
use crate::Result;
use crate::event::EventSender;
use crate::io::ExactSizeReader;
use crate::io::ReadFailure;
use crate::stream::TarSink;

/// State of one conversion pass: the entry counters, the report being
/// filled in, and the event sender.
///
/// The TAR builder is created by [`run`](Self::run) and never leaves it.
pub(crate) struct Orchestrator {
    source: ArchiveSource,
    events: EventSender,
    tracker: ProgressTracker,
    report: ConversionReport,
}

impl Orchestrator {
    pub(crate) fn new(
        source: ArchiveSource,
        total_entries: Option<usize>,
        events: EventSender,
    ) -> Self {
        Self {
            source,
            events,
            tracker: ProgressTracker::new(total_entries),
            report: ConversionReport::new(),
        }
    }

    /// Converts every entry into `sink` and writes the TAR trailer.
    ///
    /// On failure the error is also pushed into the sink so the consumer of
    /// the stream sees it, and no further bytes or events are produced.
    pub(crate) fn run(mut self, sink: TarSink) -> Result<ConversionReport> {
        let mut builder = tar::Builder::new(sink);

        let result = self
            .write_entries(&mut builder)
            .and_then(|()| finalize(&mut builder));

        match result {
            Ok(()) => {
                builder.get_mut().mark_complete();
                self.report.tar_bytes = builder.get_ref().bytes_sent();
                log::debug!(
                    "converted {}: {} entries, {} TAR bytes",
                    self.source,
                    self.report.entries(),
                    self.report.tar_bytes
                );
                Ok(self.report)
            }
            Err(err) => {
                log::warn!("conversion of {} failed: {err}", self.source);
                builder.get_mut().abort_blocking(&err);
                Err(err)
            }
        }
    }

    fn write_entries(&mut self, builder: &mut tar::Builder<TarSink>) -> Result<()> {
        let mut reader = self.source.open()?;

        while let Some(entry) = reader.next_entry()? {
            if entry.is_directory() {
                append_directory(builder, &entry)?;
                self.report.directories += 1;
            } else {
                self.report.content_bytes += append_file(builder, &mut reader, &entry)?;
                self.report.files += 1;
            }
            log::debug!("wrote {} ({} bytes)", entry.name, entry.size);

            self.events.named(&entry.name);
            if let Some(percent) = self.tracker.advance() {
                self.events.progress(percent);
            }
        }

        reader.close();
        Ok(())
    }
}

/// Builds the deterministic TAR header for `entry`.
fn entry_header(entry: &ArchiveEntry) -> tar::Header {
    let mut header = tar::Header::new_ustar();
    header.set_entry_type(entry.entry_type().tar_entry_type());
    header.set_size(entry.size);
    header.set_mode(entry.tar_mode());
    header.set_mtime(entry.tar_mtime());
    header.set_uid(0);
    header.set_gid(0);
    header
}

fn append_directory(builder: &mut tar::Builder<TarSink>, entry: &ArchiveEntry) -> Result<()> {
    let mut header = entry_header(entry);
    builder
        .append_data(&mut header, &entry.name, std::io::empty())
        .map_err(|e| write_error(&entry.name, e))
}

/// Streams the content of `entry` into a new TAR entry and returns the
/// number of content bytes copied.
fn append_file(
    builder: &mut tar::Builder<TarSink>,
    reader: &mut ArchiveReader,
    entry: &ArchiveEntry,
) -> Result<u64> {
    let content = reader.open_entry(entry)?;
    let mut content = ExactSizeReader::new(content, entry.size);
    let mut header = entry_header(entry);

    match builder.append_data(&mut header, &entry.name, &mut content) {
        Ok(()) => Ok(content.bytes_read()),
        Err(e) => Err(match content.take_failure() {
            Some(ReadFailure::Inner(source)) => ConversionError::EntryRead {
                name: entry.name.clone(),
                source,
            },
            Some(ReadFailure::Length { expected, actual }) => ConversionError::SizeMismatch {
                name: entry.name.clone(),
                expected,
                actual,
            },
            None => write_error(&entry.name, e),
        }),
    }
}

/// Writes the end-of-archive trailer and flushes buffered output.
fn finalize(builder: &mut tar::Builder<TarSink>) -> Result<()> {
    builder
        .finish()
        .and_then(|()| builder.get_mut().flush())
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::BrokenPipe {
                ConversionError::OutputClosed
            } else {
                ConversionError::Io(e)
            }
        })
}

fn write_error(name: &str, err: std::io::Error) -> ConversionError {
    if err.kind() == std::io::ErrorKind::BrokenPipe {
        ConversionError::OutputClosed
    } else {
        ConversionError::EntryWrite {
            name: name.to_owned(),
            source: err,
        }
    }
}
