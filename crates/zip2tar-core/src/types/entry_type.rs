//! Archive entry type enumeration.

/// Type of a ZIP entry as seen by the converter.
///
/// ZIP has no dedicated directory flag that every producer sets, so the
/// trailing `/` of the stored name is the only signal used.
///
/// # Examples
///
/// ```
/// use zip2tar_core::types::EntryType;
///
/// assert_eq!(EntryType::from_name("docs/"), EntryType::Directory);
/// assert_eq!(EntryType::from_name("docs/readme.md"), EntryType::File);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    /// Regular file entry.
    File,

    /// Directory entry.
    Directory,
}

impl EntryType {
    /// Classifies an entry by its stored name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name.ends_with('/') {
            Self::Directory
        } else {
            Self::File
        }
    }

    /// Returns `true` if this is a regular file.
    #[must_use]
    pub const fn is_file(self) -> bool {
        matches!(self, Self::File)
    }

    /// Returns `true` if this is a directory.
    #[must_use]
    pub const fn is_directory(self) -> bool {
        matches!(self, Self::Directory)
    }

    /// Permission bits used when the ZIP does not record Unix permissions.
    #[must_use]
    pub const fn default_mode(self) -> u32 {
        match self {
            Self::File => 0o644,
            Self::Directory => 0o755,
        }
    }

    /// The TAR header type for this entry.
    #[must_use]
    pub const fn tar_entry_type(self) -> tar::EntryType {
        match self {
            Self::File => tar::EntryType::Regular,
            Self::Directory => tar::EntryType::Directory,
        }
    }
}
