//! Command-line interface definitions for toolbar-sim.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use logging::LogArgs;

/// Command-line interface for the `toolbar-sim` binary.
#[derive(Parser, Debug)]
#[command(
    name = "toolbar-sim",
    about = "Replay toolbar widget scenarios against an in-memory desktop",
    version
)]
pub struct Cli {
    /// Logging controls shared across workspace binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// What to do.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a scenario file and print the resulting toolbar orders.
    Run(RunArgs),
    /// Parse a scenario file and report whether it is well-formed.
    Check(RunArgs),
}

/// Arguments shared by `run` and `check`.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Path to a scenario file in RON syntax.
    #[arg(value_name = "SCENARIO")]
    pub scenario: PathBuf,
}
