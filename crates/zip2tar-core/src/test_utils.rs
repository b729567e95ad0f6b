//! Test utilities for building ZIP inputs and reference TAR outputs.
//!
//! This module provides reusable helpers for creating in-memory test
//! archives, reducing code duplication across unit and integration tests.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::io::Cursor;
use std::io::Write;

use zip::write::SimpleFileOptions;

/// Creates an in-memory ZIP archive from a list of stored files.
///
/// # Examples
///
/// ```
/// use zip2tar_core::test_utils::create_test_zip;
///
/// let zip_data = create_test_zip(vec![("file.txt", b"hello"), ("dir/nested.txt", b"world")]);
/// assert!(!zip_data.is_empty());
/// ```
#[must_use]
pub fn create_test_zip(entries: Vec<(&str, &[u8])>) -> Vec<u8> {
    entries
        .into_iter()
        .fold(ZipTestBuilder::new(), |zip, (path, data)| {
            zip.add_file(path, data)
        })
        .build()
}

/// Builds a reference TAR for a list of files and directories with the
/// `tar` crate, independent of the converter.
///
/// Names ending in `/` become directories; everything else is a regular file.
#[must_use]
pub fn reference_tar(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, data) in entries {
        let mut header = tar::Header::new_ustar();
        header.set_mtime(0);
        if path.ends_with('/') {
            header.set_size(0);
            header.set_mode(0o755);
            header.set_entry_type(tar::EntryType::Directory);
            builder
                .append_data(&mut header, path, std::io::empty())
                .unwrap();
        } else {
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_entry_type(tar::EntryType::Regular);
            builder.append_data(&mut header, path, *data).unwrap();
        }
    }
    builder.into_inner().unwrap()
}

/// Replaces the first occurrence of `needle` in `data` with the bitwise
/// complement of `needle`, simulating a corrupted archive.
///
/// # Panics
///
/// Panics if `needle` does not occur in `data`.
pub fn corrupt_first(data: &mut [u8], needle: &[u8]) {
    let start = data
        .windows(needle.len())
        .position(|w| w == needle)
        .unwrap();
    for byte in &mut data[start..start + needle.len()] {
        *byte = !*byte;
    }
}

/// Replaces every occurrence of `from` in `data` with `to`, for example to
/// give two entries the same name in both their local and central headers.
///
/// # Panics
///
/// Panics if `from` and `to` differ in length or `from` does not occur.
pub fn rename_all(data: &mut [u8], from: &[u8], to: &[u8]) {
    assert_eq!(from.len(), to.len(), "replacement must keep offsets intact");
    let starts: Vec<usize> = data
        .windows(from.len())
        .enumerate()
        .filter(|(_, w)| *w == from)
        .map(|(i, _)| i)
        .collect();
    assert!(!starts.is_empty(), "pattern not found");
    for start in starts {
        data[start..start + to.len()].copy_from_slice(to);
    }
}

/// Builder for creating ZIP test archives with files and directories.
///
/// Every entry gets the same fixed timestamp so that archives built from the
/// same calls are byte-identical.
///
/// # Examples
///
/// ```
/// use zip2tar_core::test_utils::ZipTestBuilder;
///
/// let zip_data = ZipTestBuilder::new()
///     .add_file("file.txt", b"content")
///     .add_directory("dir/")
///     .build();
/// assert!(!zip_data.is_empty());
/// ```
pub struct ZipTestBuilder {
    zip: zip::ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipTestBuilder {
    /// Creates a new ZIP test builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            zip: zip::ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    fn options() -> SimpleFileOptions {
        let timestamp = zip::DateTime::from_date_and_time(2020, 6, 15, 12, 30, 0).unwrap();
        SimpleFileOptions::default().last_modified_time(timestamp)
    }

    /// Adds a stored (uncompressed) file.
    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        self.add_file_with_mode(path, data, 0o644)
    }

    /// Adds a stored file with custom Unix permissions.
    #[must_use]
    pub fn add_file_with_mode(mut self, path: &str, data: &[u8], mode: u32) -> Self {
        let options = Self::options()
            .compression_method(zip::CompressionMethod::Stored)
            .unix_permissions(mode);

        self.zip.start_file(path, options).unwrap();
        self.zip.write_all(data).unwrap();
        self
    }

    /// Adds a deflate-compressed file.
    #[must_use]
    pub fn add_deflated_file(mut self, path: &str, data: &[u8]) -> Self {
        let options = Self::options()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);

        self.zip.start_file(path, options).unwrap();
        self.zip.write_all(data).unwrap();
        self
    }

    /// Adds a directory entry. A trailing `/` is appended if missing.
    #[must_use]
    pub fn add_directory(mut self, path: &str) -> Self {
        let options = Self::options().unix_permissions(0o755);
        self.zip.add_directory(path, options).unwrap();
        self
    }

    /// Builds and returns the ZIP archive data.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.zip.finish().unwrap().into_inner()
    }
}

impl Default for ZipTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
