//! Post creation.

use anyhow::{Context, Result};
use tracing::info;
use wp_autopost_core::{NewPost, WordPressClient};

use super::report_auth_failure;
use crate::ProcessExit;
use crate::app::context::RunContext;
use crate::cli::PostArgs;

pub async fn run_post_command(ctx: &RunContext, args: &PostArgs) -> Result<ProcessExit> {
    let acquired = match ctx.acquirer().acquire().await {
        Ok(acquired) => acquired,
        Err(error) => {
            report_auth_failure(&error);
            return Ok(ProcessExit::Failure);
        }
    };
    info!(method = %acquired.method, "Publishing with acquired session");

    let client = WordPressClient::new(
        ctx.client.clone(),
        ctx.config.clone(),
        acquired.session,
        ctx.timeouts.check_request,
    );
    let post = NewPost::new(&args.title, &args.content, args.status);
    let created = client
        .create_post(&post)
        .await
        .with_context(|| format!("Failed to create {} post \"{}\"", args.status, args.title))?;

    println!("Post created: ID {}", created.id);
    if !created.link.is_empty() {
        println!("Post URL: {}", created.link);
    }
    Ok(ProcessExit::Success)
}
