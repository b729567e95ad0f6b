//! Minimal stderr logger for the `log` facade.

use console::Term;
use console::style;
use log::Level;
use log::LevelFilter;
use log::Log;
use log::Metadata;
use log::Record;

struct StderrLogger {
    level: LevelFilter,
    term: Term,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let _ = self.term.write_line(&format_record(record.level(), &record.args().to_string()));
    }

    fn flush(&self) {
        let _ = self.term.flush();
    }
}

fn level_filter(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

fn format_record(level: Level, message: &str) -> String {
    let label = match level {
        Level::Error => style("error:").for_stderr().red().bold(),
        Level::Warn => style("warning:").for_stderr().yellow().bold(),
        Level::Info => style("info:").for_stderr().green(),
        Level::Debug | Level::Trace => style("debug:").for_stderr().dim(),
    };
    format!("{label} {message}")
}

/// Installs the stderr logger. Debug records are shown only with `verbose`.
pub fn init(verbose: bool) {
    let level = level_filter(verbose);
    let logger = StderrLogger {
        level,
        term: Term::stderr(),
    };
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(level);
    }
}
