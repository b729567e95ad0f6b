//! Entry-counting pre-scan.
//!
//! Percentages need the entry total before the first entry is written. The
//! pre-scan opens the source on its own, walks every central directory
//! record without decompressing anything, and returns the count. The
//! conversion pass then opens the source again.

use crate::ArchiveSource;
use crate::ConversionError;
use crate::Result;

/// Counts the entries of `source` on the current thread.
///
/// # Errors
///
/// Returns any error raised while opening the source or reading an entry
/// record. The partial count is discarded.
///
/// # Examples
///
/// ```
/// use zip2tar_core::ArchiveSource;
/// use zip2tar_core::scan::count_entries_blocking;
/// use zip2tar_core::test_utils::create_test_zip;
///
/// let zip = create_test_zip(vec![("a.txt", b"a"), ("b.txt", b"b")]);
/// assert_eq!(count_entries_blocking(&ArchiveSource::from(zip))?, 2);
/// # Ok::<(), zip2tar_core::ConversionError>(())
/// ```
pub fn count_entries_blocking(source: &ArchiveSource) -> Result<usize> {
    let mut reader = source.open()?;
    let mut count = 0;
    while reader.next_entry()?.is_some() {
        count += 1;
    }
    reader.close();
    log::debug!("pre-scan of {source} found {count} entries");
    Ok(count)
}

/// Counts the entries of `source` on tokio's blocking pool.
///
/// # Errors
///
/// Same as [`count_entries_blocking`], plus
/// [`ConversionError::Interrupted`] if the blocking task panics.
pub async fn count_entries(source: ArchiveSource) -> Result<usize> {
    tokio::task::spawn_blocking(move || count_entries_blocking(&source))
        .await
        .map_err(|e| ConversionError::Interrupted(e.to_string()))?
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::ZipTestBuilder;

    #[test]
    fn test_counts_files_and_directories() {
        let zip = ZipTestBuilder::new()
            .add_directory("d/")
            .add_file("d/a", b"a")
            .add_deflated_file("d/b", b"bbbb")
            .build();
        assert_eq!(count_entries_blocking(&ArchiveSource::from(zip)).unwrap(), 3);
    }

    #[test]
    fn test_empty_archive() {
        let zip = ZipTestBuilder::new().build();
        assert_eq!(count_entries_blocking(&ArchiveSource::from(zip)).unwrap(), 0);
    }

    #[test]
    fn test_does_not_read_content() {
        // Corrupt content is only detected when decompressing, which the
        // pre-scan never does.
        let mut zip = ZipTestBuilder::new()
            .add_file("a.txt", b"UNIQUE-CONTENT-MARKER")
            .build();
        crate::test_utils::corrupt_first(&mut zip, b"UNIQUE-CONTENT-MARKER");
        assert_eq!(count_entries_blocking(&ArchiveSource::from(zip)).unwrap(), 1);
    }

    #[test]
    fn test_invalid_source() {
        let err = count_entries_blocking(&ArchiveSource::from(b"not a zip".to_vec())).unwrap_err();
        assert!(matches!(err, ConversionError::MissingEndOfCentralDirectory));
    }

    #[tokio::test]
    async fn test_async_count() {
        let zip = ZipTestBuilder::new().add_file("x", b"x").build();
        assert_eq!(count_entries(ArchiveSource::from(zip)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_async_missing_path() {
        let err = count_entries(ArchiveSource::from("no/such/archive.zip"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
