//! CLI entry point for wp-autopost.

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};

mod app;
mod cli;
mod commands;

use app::{dispatcher, terminal};
use cli::Cli;

/// Process outcome mapped to the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Exit code 0.
    Success,
    /// Exit code 1.
    Failure,
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        match exit {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::Failure => ExitCode::FAILURE,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse before tracing so --help works without logs
    let cli = Cli::parse();

    terminal::init_tracing(terminal::resolve_default_log_level(
        cli.global.verbose,
        cli.global.quiet,
    ));
    debug!(command = ?cli.command, "CLI arguments parsed");

    match dispatcher::dispatch(&cli).await {
        Ok(exit) => exit.into(),
        Err(err) => {
            error!("{err:#}");
            ProcessExit::Failure.into()
        }
    }
}
