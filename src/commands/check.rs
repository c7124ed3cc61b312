//! Connectivity and permission check.

use anyhow::Result;
use tracing::{error, warn};
use wp_autopost_core::{WordPressClient, check_site};

use super::report_auth_failure;
use crate::ProcessExit;
use crate::app::context::RunContext;

pub async fn run_check_command(ctx: &RunContext) -> Result<ProcessExit> {
    println!("Testing connection to: {}", ctx.config.base_url());
    if let Some(credentials) = ctx.config.credentials() {
        println!(
            "Credentials: {} / {}",
            credentials.username(),
            credentials.masked_password()
        );
    }

    let report = match check_site(&ctx.config, &ctx.check_client, ctx.timeouts.check_request).await {
        Ok(report) => report,
        Err(check_error) => {
            error!("{check_error}");
            return Ok(ProcessExit::Failure);
        }
    };
    println!("Site is reachable (HTTP {})", report.root_status);
    println!(
        "REST API available: {} (wp/v2: {})",
        report.site_name.as_deref().unwrap_or("<unnamed site>"),
        if report.has_wp_v2 { "yes" } else { "no" }
    );
    println!("Posts endpoint returned {} posts", report.visible_posts);

    let acquired = match ctx.acquirer().acquire().await {
        Ok(acquired) => acquired,
        Err(auth_error) => {
            report_auth_failure(&auth_error);
            return Ok(ProcessExit::Failure);
        }
    };
    println!(
        "Authenticated via {} ({} session)",
        acquired.method,
        acquired.session.kind()
    );

    let client = WordPressClient::new(
        ctx.client.clone(),
        ctx.config.clone(),
        acquired.session,
        ctx.timeouts.check_request,
    );
    let profile = match client.current_user().await {
        Ok(profile) => profile,
        Err(api_error) => {
            error!("Failed to load the current user: {api_error}");
            return Ok(ProcessExit::Failure);
        }
    };
    println!("Logged in as: {}", profile.display_label());
    println!("User roles: {}", profile.roles_label());

    if profile.can_create_posts() {
        println!("User has permission to create/edit posts");
        Ok(ProcessExit::Success)
    } else {
        warn!("User lacks publish_posts/edit_posts; use an account with appropriate permissions");
        Ok(ProcessExit::Failure)
    }
}
