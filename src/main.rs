//! Grader CLI - runs grading service scripts against a DS server
//!
//! Asks the remote grading service to run numbered UDP/TCP test scripts
//! against a server, prints the COMMAND lines of each report and resets the
//! server's local state between scripts.

use clap::Parser;
use grader::{cli, commands::Commands, common::logging};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "grader", about = "Drive the remote grading service against a DS server")]
#[command(version, long_about = None)]
struct Cli {
    /// Configuration file (default: platform config dir, grader-cli/config.toml)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    logging::init_cli();

    let cli = Cli::parse();

    if let Err(e) = cli::dispatch(cli.command, cli.config.as_deref()).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
