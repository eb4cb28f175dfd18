//! CLI command definitions
//!
//! Defines the clap commands for the grader CLI.

use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Reset server state, then run script sequences against the grading service
    Run {
        /// Named sequence to run (repeatable, run in the given order)
        #[arg(long = "sequence", short = 's')]
        sequences: Vec<String>,

        /// Ad-hoc script list run after the named sequences, e.g. "6,9,20-25"
        #[arg(long)]
        scripts: Option<String>,

        #[command(flatten)]
        target: TargetArgs,

        /// Do not reset server state after each script
        #[arg(long)]
        no_reset: bool,

        /// Seconds to wait between scripts
        #[arg(long)]
        delay: Option<u64>,

        /// Print the run summary as JSON instead of the report
        #[arg(long)]
        json: bool,
    },

    /// Wipe and recreate the server state directories
    Reset,

    /// Print the COMMAND lines of a saved grading report
    Extract {
        /// Path to the saved HTML body, or "-" for stdin
        path: PathBuf,
    },

    /// List available script sequences
    #[command(alias = "ls")]
    Sequences,

    /// Show the effective configuration
    Config,
}

/// Server under test and grading service location
#[derive(Args, Debug, Default)]
pub struct TargetArgs {
    /// IP address of the server under test
    #[arg(long)]
    pub ip: Option<String>,

    /// Port of the server under test
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Grading service URL
    #[arg(long)]
    pub url: Option<String>,
}
