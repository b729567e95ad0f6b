//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use crate::commands::convert::ConversionSummary;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::io::{self};

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_conversion_result(&self, summary: &ConversionSummary) -> Result<()> {
        Self::output(&JsonOutput::success("convert", summary))
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::error("convert", format!("{error:#}"));
        let _ = Self::output(&output);
    }
}
