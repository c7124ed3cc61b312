//! Authenticated REST calls made with an acquired session.

use std::time::Duration;

use reqwest::header::{ACCEPT, COOKIE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use super::error::WordPressError;
use super::types::{CreatedPost, NewPost, PostSummary, UserProfile};
use crate::auth::{Session, USERS_ME_PATH};
use crate::config::SiteConfig;

/// Admin-ajax action that returns a `wp_rest` nonce for the logged-in user.
pub const REST_NONCE_PATH: &str = "/wp-admin/admin-ajax.php?action=rest-nonce";
/// Posts collection endpoint.
pub const POSTS_PATH: &str = "/wp-json/wp/v2/posts";
/// Header carrying the REST nonce on cookie-authenticated calls.
pub const NONCE_HEADER: &str = "X-WP-Nonce";

/// REST client bound to one site and one session.
#[derive(Debug, Clone)]
pub struct WordPressClient {
    client: Client,
    config: SiteConfig,
    session: Session,
    timeout: Duration,
}

impl WordPressClient {
    /// Creates a client; `timeout` applies to every request.
    #[must_use]
    pub fn new(client: Client, config: SiteConfig, session: Session, timeout: Duration) -> Self {
        Self {
            client,
            config,
            session,
            timeout,
        }
    }

    /// Fetches a REST nonce for the cookie session.
    ///
    /// # Errors
    ///
    /// Returns [`WordPressError::NonceUnavailable`] for Basic sessions or when
    /// the site answers without a nonce, and network or status errors otherwise.
    #[instrument(skip(self))]
    pub async fn fetch_rest_nonce(&self) -> Result<String, WordPressError> {
        let Some(jar) = self.session.cookie_jar() else {
            return Err(WordPressError::nonce_unavailable(
                "basic sessions authenticate without a nonce",
            ));
        };

        let url = self.config.endpoint(REST_NONCE_PATH);
        let response = self
            .client
            .get(&url)
            .header(COOKIE, jar.header_value())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| WordPressError::network(&url, source))?;
        let body = expect_status(&url, response, StatusCode::OK).await?;

        let nonce = body.trim();
        if nonce.is_empty() || nonce == "0" || nonce == "-1" {
            return Err(WordPressError::nonce_unavailable(format!(
                "admin-ajax answered '{nonce}'; the cookie session is probably not logged in"
            )));
        }
        debug!("REST nonce obtained");
        Ok(nonce.to_string())
    }

    /// Fetches the authenticated user's profile (edit context).
    ///
    /// # Errors
    ///
    /// Returns network, status, or parse errors.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<UserProfile, WordPressError> {
        let url = self.config.endpoint(&format!("{USERS_ME_PATH}?context=edit"));
        self.get_json(&url).await
    }

    /// Lists the first page of posts visible to the session.
    ///
    /// # Errors
    ///
    /// Returns network, status, or parse errors.
    #[instrument(skip(self))]
    pub async fn list_posts(&self, per_page: u8) -> Result<Vec<PostSummary>, WordPressError> {
        let url = self
            .config
            .endpoint(&format!("{POSTS_PATH}?per_page={}", per_page.clamp(1, 100)));
        self.get_json(&url).await
    }

    /// Creates a post.
    ///
    /// Cookie sessions fetch a REST nonce first and send it with the request.
    ///
    /// # Errors
    ///
    /// Returns [`WordPressError::HttpStatus`] unless the site answers 201, and
    /// nonce, network, or parse errors otherwise.
    #[instrument(skip(self, post), fields(title = %post.title, status = %post.status))]
    pub async fn create_post(&self, post: &NewPost) -> Result<CreatedPost, WordPressError> {
        let url = self.config.endpoint(POSTS_PATH);
        let mut request = self.authorized(self.client.post(&url)).json(post);
        if self.session.cookie_jar().is_some() {
            request = request.header(NONCE_HEADER, self.fetch_rest_nonce().await?);
        }

        let response = request
            .send()
            .await
            .map_err(|source| WordPressError::network(&url, source))?;
        let body = expect_status(&url, response, StatusCode::CREATED).await?;
        let created: CreatedPost = parse_json(&url, &body)?;
        info!(id = created.id, link = %created.link, "Post created");
        Ok(created)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, WordPressError> {
        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(|source| WordPressError::network(url, source))?;
        let body = expect_status(url, response, StatusCode::OK).await?;
        parse_json(url, &body)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        self.session
            .authorize(request)
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
    }
}

/// Reads the body and fails unless the status matches `expected`.
pub(crate) async fn expect_status(
    url: &str,
    response: Response,
    expected: StatusCode,
) -> Result<String, WordPressError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| WordPressError::network(url, source))?;
    if status == expected {
        Ok(body)
    } else {
        Err(WordPressError::http_status(url, status.as_u16(), &body))
    }
}

pub(crate) fn parse_json<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, WordPressError> {
    serde_json::from_str(body)
        .map_err(|error| WordPressError::invalid_response(url, error.to_string()))
}
