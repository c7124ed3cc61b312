//! Session command handlers: login, capture, and clear persisted cookies.

use anyhow::{Result, anyhow};
use tracing::info;
use wp_autopost_core::{ManualCookieCapture, SessionKind};

use super::report_auth_failure;
use crate::ProcessExit;
use crate::app::context::{RunContext, resolve_cookie_file};
use crate::cli::GlobalArgs;

pub async fn run_login_command(ctx: &RunContext) -> Result<ProcessExit> {
    let mut acquirer = ctx.acquirer();
    match acquirer.acquire().await {
        Ok(acquired) => {
            println!(
                "Authenticated via {} ({} session)",
                acquired.method,
                acquired.session.kind()
            );
            if acquired.session.kind() == SessionKind::Cookie {
                println!("Cookie file: {}", ctx.cookie_file.path().display());
            }
            Ok(ProcessExit::Success)
        }
        Err(error) => {
            report_auth_failure(&error);
            Ok(ProcessExit::Failure)
        }
    }
}

pub fn run_capture_command(ctx: &RunContext) -> Result<ProcessExit> {
    let capture = ManualCookieCapture::new(ctx.config.login_url());
    let mut prompt = ctx.prompt();
    let jar = match capture.run(&mut prompt) {
        Ok(jar) => jar,
        Err(error) => {
            report_auth_failure(&error);
            return Ok(ProcessExit::Failure);
        }
    };

    ctx.cookie_file
        .save(&jar)
        .map_err(|error| anyhow!("Failed to save captured cookies: {error}"))?;
    println!(
        "Saved {} cookies to {}",
        jar.len(),
        ctx.cookie_file.path().display()
    );
    println!("You can now run `wp-autopost post` to publish with this session.");
    Ok(ProcessExit::Success)
}

pub fn run_clear_command(args: &GlobalArgs) -> Result<ProcessExit> {
    let cookie_file = resolve_cookie_file(args)?;
    let removed = cookie_file
        .clear()
        .map_err(|error| anyhow!("Failed to clear saved cookies: {error}"))?;

    if removed {
        info!(path = %cookie_file.path().display(), "Cleared saved cookies");
        println!("Removed {}", cookie_file.path().display());
    } else {
        println!("No saved cookies at {}", cookie_file.path().display());
    }
    Ok(ProcessExit::Success)
}
