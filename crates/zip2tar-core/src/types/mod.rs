//! Value types shared by the reader and the converter.

pub mod entry;
pub mod entry_type;

pub use entry::ArchiveEntry;
pub use entry_type::EntryType;
