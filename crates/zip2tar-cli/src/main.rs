//! zip2tar CLI - converts ZIP archives into gzipped TAR archives.

mod cli;
mod commands;
mod error;
mod logging;
mod output;
mod progress;

use anyhow::Result;
use clap::CommandFactory;
use clap::Parser;
use std::io::IsTerminal;
use std::process::ExitCode;

use crate::commands::convert::ConvertSettings;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    logging::init(cli.verbose);

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    match run(&cli, &*formatter).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            formatter.format_error(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &cli::Cli, formatter: &dyn OutputFormatter) -> Result<()> {
    if let Some(cli::Commands::Completions { shell }) = cli.command {
        commands::completion::execute(shell);
        return Ok(());
    }

    let settings = ConvertSettings {
        level: flate2::Compression::new(cli.level),
        force: cli.force,
        progress: !cli.quiet && !cli.json && CliProgress::should_show(),
        verbose: cli.verbose,
    };

    if !cli.files.is_empty() {
        return commands::convert::execute(&cli.files, cli.output.as_deref(), settings, formatter)
            .await;
    }

    if std::io::stdin().is_terminal() {
        cli::Cli::command().print_help()?;
        return Ok(());
    }
    commands::convert::execute_stdin(settings).await
}
