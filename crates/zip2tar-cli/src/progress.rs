//! Progress bar implementation for CLI conversions.

use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use zip2tar_core::ConversionEvent;

/// CLI progress bar driven by conversion events.
///
/// Renders `NN%: <archive>` with a bar, and the current entry name in
/// verbose mode. Cleared on drop.
pub struct CliProgress {
    bar: ProgressBar,
    show_entries: bool,
}

impl CliProgress {
    /// Creates a progress bar for the archive named `archive`.
    #[must_use]
    pub fn new(archive: &str, show_entries: bool) -> Self {
        let bar = ProgressBar::new(100);

        // Template: " 42%: archive.zip [████████░░░░] docs/readme.md"
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{pos:>3}%: {prefix} [{bar:30.cyan/blue}] {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        bar.set_prefix(archive.to_string());

        Self { bar, show_entries }
    }

    /// Checks if we should show progress (TTY detection).
    #[must_use]
    pub fn should_show() -> bool {
        Term::stdout().is_term()
    }

    /// Applies one conversion event to the bar.
    pub fn on_event(&self, event: &ConversionEvent) {
        match event {
            ConversionEvent::Progress(percent) => self.bar.set_position(u64::from(*percent)),
            ConversionEvent::Named(name) if self.show_entries => self.bar.set_message(name.clone()),
            ConversionEvent::Named(_) => {}
        }
    }

    #[cfg(test)]
    fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}
