//! CLI command routing.
//!
//! `clear` only touches the cookie file and runs without site configuration;
//! every other command builds a [`RunContext`] first.

use anyhow::Result;

use crate::app::context::RunContext;
use crate::cli::{Cli, Command};
use crate::{ProcessExit, commands};

pub(crate) async fn dispatch(cli: &Cli) -> Result<ProcessExit> {
    if let Command::Clear = cli.command {
        return commands::run_clear_command(&cli.global);
    }

    let ctx = RunContext::from_args(&cli.global)?;
    match &cli.command {
        Command::Login => commands::run_login_command(&ctx).await,
        Command::Capture => commands::run_capture_command(&ctx),
        Command::Check => commands::run_check_command(&ctx).await,
        Command::Post(post_args) => commands::run_post_command(&ctx, post_args).await,
        Command::Clear => commands::run_clear_command(&cli.global),
    }
}
