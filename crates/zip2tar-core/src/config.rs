//! Conversion options.

/// Options accepted by [`convert`](crate::convert).
///
/// # Examples
///
/// ```
/// use zip2tar_core::ConvertOptions;
///
/// let quiet = ConvertOptions::default();
/// assert!(!quiet.progress);
///
/// let verbose = ConvertOptions::default().with_progress(true);
/// assert!(verbose.progress);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Run a pre-scan pass to count entries and emit
    /// [`ConversionEvent::Progress`](crate::ConversionEvent::Progress)
    /// after each entry.
    ///
    /// Default: `false`.
    pub progress: bool,
}

impl ConvertOptions {
    /// Creates options with every feature disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables progress reporting.
    #[must_use]
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }
}
