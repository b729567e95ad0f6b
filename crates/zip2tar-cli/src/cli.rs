//! CLI argument parsing using clap.

use clap::ArgAction;
use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "zip2tar")]
#[command(author, version, about, long_about = None)]
#[command(disable_version_flag = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// ZIP archives to convert; reads stdin and writes stdout when omitted
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Destination file (single input only)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Overwrite existing destination files
    #[arg(short, long)]
    pub force: bool,

    /// Gzip compression level (1-9)
    #[arg(short, long, default_value = "6", value_parser = clap::value_parser!(u32).range(1..=9))]
    pub level: u32,

    /// Enable debug logging on stderr
    #[arg(long)]
    pub verbose: bool,

    /// Suppress progress and summaries
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long)]
    pub json: bool,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    #[allow(dead_code)]
    version: (),
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}
