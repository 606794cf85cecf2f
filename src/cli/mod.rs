//! Command-line interface

mod commands;
mod runner;

pub use commands::{Cli, Commands, FormatArg};
pub use runner::Runner;
