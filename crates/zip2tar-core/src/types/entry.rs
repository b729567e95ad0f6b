//! Metadata of a single ZIP central directory record.

use super::EntryType;

/// One entry read from a ZIP central directory.
///
/// Entries are produced by [`ArchiveReader::next_entry`] in the order the
/// archive stores them and are immutable afterwards.
///
/// [`ArchiveReader::next_entry`]: crate::source::ArchiveReader::next_entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Position in the central directory.
    pub index: usize,

    /// Relative path with `/` separators, as stored in the ZIP.
    pub name: String,

    /// Uncompressed size in bytes. Always 0 for directories.
    pub size: u64,

    /// Unix permission bits, when the ZIP records them.
    pub mode: Option<u32>,

    /// Last modification time in seconds since the Unix epoch.
    pub modified: Option<u64>,
}

impl ArchiveEntry {
    /// Creates an entry without permission or timestamp metadata.
    ///
    /// # Examples
    ///
    /// ```
    /// use zip2tar_core::ArchiveEntry;
    ///
    /// let entry = ArchiveEntry::new(0, "docs/", 0);
    /// assert!(entry.is_directory());
    /// ```
    #[must_use]
    pub fn new(index: usize, name: impl Into<String>, size: u64) -> Self {
        let name = name.into();
        let size = if EntryType::from_name(&name).is_directory() {
            0
        } else {
            size
        };
        Self {
            index,
            name,
            size,
            mode: None,
            modified: None,
        }
    }

    /// Sets the Unix permission bits.
    #[must_use]
    pub fn with_mode(mut self, mode: Option<u32>) -> Self {
        self.mode = mode.map(|m| m & 0o7777);
        self
    }

    /// Sets the modification time.
    #[must_use]
    pub fn with_modified(mut self, modified: Option<u64>) -> Self {
        self.modified = modified;
        self
    }

    /// Returns the entry type, derived from the trailing `/` of the name.
    #[must_use]
    pub fn entry_type(&self) -> EntryType {
        EntryType::from_name(&self.name)
    }

    /// Returns `true` if the name ends with `/`.
    #[must_use]
    pub fn is_directory(&self) -> bool {
        self.entry_type().is_directory()
    }

    /// Permission bits to write into the TAR header.
    #[must_use]
    pub fn tar_mode(&self) -> u32 {
        self.mode
            .filter(|m| *m != 0)
            .unwrap_or_else(|| self.entry_type().default_mode())
    }

    /// Modification time to write into the TAR header.
    #[must_use]
    pub fn tar_mtime(&self) -> u64 {
        self.modified.unwrap_or(0)
    }
}
