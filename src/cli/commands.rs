//! CLI commands and argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// pagewalk CLI
#[derive(Parser, Debug)]
#[command(name = "pagewalk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Source definition file (YAML)
    #[arg(short, long, global = true)]
    pub definition: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse and validate a definition file
    Validate,

    /// Fetch the first page only and report what came back
    Check,

    /// Run a full collection and write the result
    Run {
        /// Maximum items to collect (overrides the definition)
        #[arg(long)]
        cap: Option<usize>,

        /// Output path (overrides the definition)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (overrides the definition)
        #[arg(short, long)]
        format: Option<FormatArg>,
    },
}

/// Output format flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// CSV rows
    Csv,
    /// JSON array
    Json,
}

impl From<FormatArg> for crate::config::OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Csv => Self::Csv,
            FormatArg::Json => Self::Json,
        }
    }
}
