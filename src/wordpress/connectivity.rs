//! Unauthenticated connectivity check: site root, REST index, posts endpoint.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{info, instrument};

use super::client::{POSTS_PATH, expect_status, parse_json};
use super::error::{CheckStep, WordPressError};
use super::types::{PostSummary, RestIndex, SiteReport};
use crate::config::SiteConfig;

/// REST index path.
pub const REST_INDEX_PATH: &str = "/wp-json";
/// Core REST namespace.
pub const WP_V2_NAMESPACE: &str = "wp/v2";

/// Runs the connectivity steps in order and stops at the first failure.
///
/// `client` should follow redirects (see [`crate::build_check_client`]);
/// the site root counts as reachable for any final status below 400.
///
/// # Errors
///
/// Returns [`WordPressError::CheckFailed`] naming the failing step.
#[instrument(skip(config, client), fields(site = %config.base_url()))]
pub async fn check_site(
    config: &SiteConfig,
    client: &Client,
    timeout: Duration,
) -> Result<SiteReport, WordPressError> {
    let root_url = config.base_url().to_string();
    let response = client
        .get(&root_url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|source| WordPressError::network(&root_url, source).at_step(CheckStep::Reachability))?;
    let root_status = response.status().as_u16();
    if root_status >= 400 {
        return Err(WordPressError::http_status(&root_url, root_status, "")
            .at_step(CheckStep::Reachability));
    }
    info!(status = root_status, "Site is reachable");

    let index: RestIndex = get_json(client, &config.endpoint(REST_INDEX_PATH), timeout)
        .await
        .map_err(|error| error.at_step(CheckStep::RestIndex))?;
    let has_wp_v2 = index.namespaces.iter().any(|ns| ns == WP_V2_NAMESPACE);
    info!(
        site_name = index.name.as_deref().unwrap_or("<unnamed>"),
        has_wp_v2,
        "REST API is available"
    );

    let posts: Vec<PostSummary> = get_json(client, &config.endpoint(POSTS_PATH), timeout)
        .await
        .map_err(|error| error.at_step(CheckStep::PostsEndpoint))?;
    info!(count = posts.len(), "Posts endpoint is available");

    Ok(SiteReport {
        root_status,
        site_name: index.name,
        has_wp_v2,
        visible_posts: posts.len(),
    })
}

async fn get_json<T: serde::de::DeserializeOwned>(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<T, WordPressError> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|source| WordPressError::network(url, source))?;
    let body = expect_status(url, response, StatusCode::OK).await?;
    parse_json(url, &body)
}
