//! `aut`: command line interface to Autonity.
//!
//! Parses the command line, installs logging and runs one command. The
//! command's result goes to stdout; errors and diagnostics go to stderr.

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;

use aut_cli::cli::{run, Cli};
use aut_cli::observability::init_logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "aut starting");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            if verbose {
                let mut source = e.source();
                while let Some(cause) = source {
                    eprintln!("  caused by: {cause}");
                    source = cause.source();
                }
            }
            ExitCode::FAILURE
        }
    }
}
