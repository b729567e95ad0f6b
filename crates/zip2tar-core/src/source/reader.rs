//! Pull-based reader over a ZIP central directory.

use std::fs::File;
use std::io::BufReader;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;

use bytes::Bytes;

use super::ArchiveSource;
use super::eocd::find_end_of_central_directory;
use crate::ArchiveEntry;
use crate::ConversionError;
use crate::Result;

/// Byte source backing one open archive.
enum SourceReader {
    File(BufReader<File>),
    Memory(Cursor<Bytes>),
}

impl Read for SourceReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Self::File(reader) => reader.read(buf),
            Self::Memory(reader) => reader.read(buf),
        }
    }
}

impl Seek for SourceReader {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        match self {
            Self::File(reader) => reader.seek(pos),
            Self::Memory(reader) => reader.seek(pos),
        }
    }
}

/// An open ZIP archive traversed one entry at a time.
///
/// The caller pulls entries with [`next_entry`](Self::next_entry); nothing is
/// read ahead. Content is only decompressed when
/// [`open_entry`](Self::open_entry) is called for a specific entry.
///
/// # Examples
///
/// ```no_run
/// use zip2tar_core::ArchiveSource;
///
/// # fn main() -> zip2tar_core::Result<()> {
/// let mut reader = ArchiveSource::from("archive.zip").open()?;
/// while let Some(entry) = reader.next_entry()? {
///     println!("{} ({} bytes)", entry.name, entry.size);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ArchiveReader {
    archive: zip::ZipArchive<SourceReader>,
    next_index: usize,
}

impl ArchiveReader {
    /// Opens a ZIP archive.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the path does not exist ([`ConversionError::NotFound`])
    /// - the input has no end of central directory record
    ///   ([`ConversionError::MissingEndOfCentralDirectory`])
    /// - the central directory is corrupt, or holds several records with
    ///   the same name ([`ConversionError::InvalidArchive`])
    pub fn open(source: &ArchiveSource) -> Result<Self> {
        let mut reader = match source {
            ArchiveSource::Path(path) => {
                let file = File::open(path).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        ConversionError::NotFound { path: path.clone() }
                    } else {
                        ConversionError::Io(e)
                    }
                })?;
                SourceReader::File(BufReader::new(file))
            }
            ArchiveSource::Buffer(bytes) => SourceReader::Memory(Cursor::new(bytes.clone())),
        };

        let Some(eocd) = find_end_of_central_directory(&mut reader)? else {
            return Err(ConversionError::MissingEndOfCentralDirectory);
        };

        let archive = zip::ZipArchive::new(reader).map_err(ConversionError::from_zip)?;
        if let Some(total) = eocd.total_entries
            && archive.len() < usize::from(total)
        {
            return Err(ConversionError::InvalidArchive(format!(
                "duplicate entry names: {total} central directory records, {} distinct names",
                archive.len()
            )));
        }
        log::debug!("opened {source}: {} entries", archive.len());

        Ok(Self {
            archive,
            next_index: 0,
        })
    }

    /// Number of records in the central directory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Returns `true` if the archive has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    /// Reads the metadata of the next entry without decompressing it.
    ///
    /// Returns `Ok(None)` once every entry has been returned.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::InvalidArchive`] if the entry record is
    /// corrupt.
    pub fn next_entry(&mut self) -> Result<Option<ArchiveEntry>> {
        if self.next_index >= self.archive.len() {
            return Ok(None);
        }

        let index = self.next_index;
        let file = self
            .archive
            .by_index_raw(index)
            .map_err(ConversionError::from_zip)?;

        let entry = ArchiveEntry::new(index, file.name(), file.size())
            .with_mode(file.unix_mode())
            .with_modified(file.last_modified().map(|dt| {
                unix_timestamp(
                    dt.year(),
                    dt.month(),
                    dt.day(),
                    dt.hour(),
                    dt.minute(),
                    dt.second(),
                )
            }));
        drop(file);

        self.next_index += 1;
        Ok(Some(entry))
    }

    /// Opens the decompressed content of `entry`.
    ///
    /// The returned reader yields the entry's uncompressed bytes. Corrupt or
    /// truncated data surfaces as a read error.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::EntryRead`] if the entry cannot be opened,
    /// for example because it uses an unsupported compression method.
    pub fn open_entry(&mut self, entry: &ArchiveEntry) -> Result<impl Read + '_> {
        self.archive
            .by_index(entry.index)
            .map_err(|e| ConversionError::EntryRead {
                name: entry.name.clone(),
                source: match e {
                    zip::result::ZipError::Io(io_err) => io_err,
                    other => std::io::Error::other(other),
                },
            })
    }

    /// Closes the archive, releasing the underlying file handle.
    pub fn close(self) {
        log::debug!("closed archive after {} entries", self.next_index);
    }
}

/// Converts a ZIP (DOS) timestamp, interpreted as UTC, into Unix seconds.
fn unix_timestamp(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> u64 {
    let month = i64::from(month);
    let year = i64::from(year) - i64::from(month <= 2);
    let era = year.div_euclid(400);
    let year_of_era = year - era * 400;
    let day_of_year = (153 * ((month + 9) % 12) + 2) / 5 + i64::from(day) - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    let days = era * 146_097 + day_of_era - 719_468;

    let secs =
        days * 86_400 + i64::from(hour) * 3_600 + i64::from(minute) * 60 + i64::from(second);
    u64::try_from(secs).unwrap_or(0)
}
