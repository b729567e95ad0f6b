//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use crate::commands::convert::ConversionSummary;
use anyhow::Result;
use console::Term;
use console::style;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let digits = n.to_string();
        let mut result = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                result.push(',');
            }
            result.push(c);
        }
        result
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_conversion_result(&self, summary: &ConversionSummary) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let headline = format!("{} -> {}", summary.source, summary.destination);
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {headline}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(&format!("Converted {headline}"));
        }

        let _ = self.term.write_line(&format!(
            "  Files:            {}",
            Self::format_number(summary.files)
        ));
        let _ = self.term.write_line(&format!(
            "  Directories:      {}",
            Self::format_number(summary.directories)
        ));
        let _ = self.term.write_line(&format!(
            "  Content size:     {}",
            Self::format_size(summary.content_bytes)
        ));
        let _ = self.term.write_line(&format!(
            "  Compressed size:  {}",
            Self::format_size(summary.compressed_bytes)
        ));

        if self.verbose {
            let _ = self.term.write_line(&format!(
                "  TAR size:         {}",
                Self::format_size(summary.tar_bytes)
            ));
            let _ = self
                .term
                .write_line(&format!("  Duration:         {:?}", summary.duration));
        }

        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Errors go to stderr even in quiet mode
        let term = Term::stderr();
        if console::colors_enabled_stderr() {
            let _ = term.write_line(&format!(
                "{} {error:?}",
                style("ERROR:").for_stderr().red().bold()
            ));
        } else {
            let _ = term.write_line(&format!("ERROR: {error:?}"));
        }
    }
}
