//! Conversion operation reporting.

use std::time::Duration;

/// Report of a completed conversion.
///
/// Returned by [`Conversion::finish`](crate::Conversion::finish) when the
/// whole archive has been written and the TAR trailer emitted.
///
/// # Examples
///
/// ```
/// use zip2tar_core::ConversionReport;
///
/// let mut report = ConversionReport::default();
/// report.files = 3;
/// report.directories = 1;
/// assert_eq!(report.entries(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    /// Number of regular files written.
    pub files: usize,

    /// Number of directories written.
    pub directories: usize,

    /// Uncompressed content bytes copied from the ZIP.
    pub content_bytes: u64,

    /// Total TAR bytes emitted, including headers, padding and trailer.
    pub tar_bytes: u64,

    /// Duration of the conversion, pre-scan included.
    pub duration: Duration,
}

impl ConversionReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of entries written.
    #[must_use]
    pub fn entries(&self) -> usize {
        self.files + self.directories
    }

    /// Ratio of TAR bytes to content bytes, or 0.0 when there is no content.
    ///
    /// Values above 1.0 are header and padding overhead.
    #[must_use]
    pub fn overhead_ratio(&self) -> f64 {
        if self.content_bytes == 0 {
            return 0.0;
        }
        self.tar_bytes as f64 / self.content_bytes as f64
    }
}
