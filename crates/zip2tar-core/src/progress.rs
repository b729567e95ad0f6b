//! Entry counting and percentage reporting for one conversion.

/// Progress counters of a single conversion session.
///
/// The tracker is created with the entry total found by the pre-scan, or
/// without one when progress reporting is disabled. Each completed entry is
/// recorded with [`advance`](Self::advance), which returns a percentage only
/// when it differs from the last one returned.
///
/// # Examples
///
/// ```
/// use zip2tar_core::ProgressTracker;
///
/// let mut tracker = ProgressTracker::new(Some(3));
/// assert_eq!(tracker.advance(), Some(33));
/// assert_eq!(tracker.advance(), Some(67));
/// assert_eq!(tracker.advance(), Some(100));
///
/// let mut silent = ProgressTracker::new(None);
/// assert_eq!(silent.advance(), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    total_entries: Option<usize>,
    processed_entries: usize,
    last_percent: u8,
}

impl ProgressTracker {
    /// Creates a tracker. `None` disables percentage reporting.
    #[must_use]
    pub fn new(total_entries: Option<usize>) -> Self {
        Self {
            total_entries,
            processed_entries: 0,
            last_percent: 0,
        }
    }

    /// Records one completed entry and returns the new percentage if it
    /// changed.
    ///
    /// The percentage is `processed * 100 / total` rounded half up, and is
    /// clamped so it never exceeds 100 or goes backwards.
    pub fn advance(&mut self) -> Option<u8> {
        self.processed_entries += 1;

        let total = self.total_entries.filter(|total| *total > 0)?;
        let processed = self.processed_entries.min(total);
        let percent = u8::try_from((processed * 200 + total) / (total * 2))
            .unwrap_or(100)
            .min(100);

        if percent > self.last_percent {
            self.last_percent = percent;
            Some(percent)
        } else {
            None
        }
    }

    /// Number of entries recorded so far.
    #[must_use]
    pub fn processed_entries(&self) -> usize {
        self.processed_entries
    }

    /// Entry total from the pre-scan, if any.
    #[must_use]
    pub fn total_entries(&self) -> Option<usize> {
        self.total_entries
    }

    /// Last percentage returned by [`advance`](Self::advance).
    #[must_use]
    pub fn last_percent(&self) -> u8 {
        self.last_percent
    }
}
