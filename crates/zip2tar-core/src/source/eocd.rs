//! Locating the end of central directory record.
//!
//! The `zip` crate reports a missing end of central directory record with a
//! version-dependent message. The check runs before the archive is parsed so
//! that "this is not a ZIP at all" is reported as its own error. It also
//! reads the record count, which the `zip` crate does not expose: its index
//! is keyed by name, so records sharing a name collapse into one.

use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;

/// Signature of the end of central directory record (`PK\x05\x06`).
const EOCD_SIGNATURE: [u8; 4] = *b"PK\x05\x06";

/// Fixed size of the end of central directory record.
const EOCD_SIZE: u64 = 22;

/// Offset of the "total number of records" field within the record.
const TOTAL_ENTRIES_OFFSET: usize = 10;

/// Maximum ZIP comment length, which bounds how far from the end the record
/// can start.
const MAX_COMMENT_SIZE: u64 = 65_535;

/// Fields of the end of central directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    /// Total number of central directory records, or `None` when the field
    /// is saturated and the real count lives in the ZIP64 record.
    pub total_entries: Option<u16>,
}

/// Locates the end of central directory record in the tail of `reader`.
///
/// Returns `None` if no complete record is found. Leaves the reader
/// positioned at the start.
pub fn find_end_of_central_directory<R: Read + Seek>(
    reader: &mut R,
) -> std::io::Result<Option<EndOfCentralDirectory>> {
    let len = reader.seek(SeekFrom::End(0))?;
    if len < EOCD_SIZE {
        reader.seek(SeekFrom::Start(0))?;
        return Ok(None);
    }

    let window = (MAX_COMMENT_SIZE + EOCD_SIZE).min(len);
    reader.seek(SeekFrom::Start(len - window))?;

    // window is bounded by 64 KiB + 22 bytes
    #[allow(clippy::cast_possible_truncation)]
    let mut tail = vec![0u8; window as usize];
    reader.read_exact(&mut tail)?;
    reader.seek(SeekFrom::Start(0))?;

    // both casts are bounded by the window size
    #[allow(clippy::cast_possible_truncation)]
    let last_start = tail.len() - EOCD_SIZE as usize;
    let record = (0..=last_start)
        .rev()
        .find(|&start| tail[start..start + EOCD_SIGNATURE.len()] == EOCD_SIGNATURE);

    Ok(record.map(|start| {
        let field = start + TOTAL_ENTRIES_OFFSET;
        let total = u16::from_le_bytes([tail[field], tail[field + 1]]);
        EndOfCentralDirectory {
            total_entries: (total != u16::MAX).then_some(total),
        }
    }))
}
