//! HTTP Basic fallback using a WordPress application password.
//!
//! Stateless: the token is recomputed from the credentials for every request
//! and never written to disk.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use tracing::{info, instrument, warn};

use super::AuthError;
use crate::config::{Credentials, SiteConfig};
use crate::wordpress::UserProfile;

/// Authenticated endpoint used to probe credentials.
pub const USERS_ME_PATH: &str = "/wp-json/wp/v2/users/me";

const BODY_EXCERPT_CHARS: usize = 200;

/// Returns `base64(username:password)`.
#[must_use]
pub fn basic_token(credentials: &Credentials) -> String {
    STANDARD.encode(format!(
        "{}:{}",
        credentials.username(),
        credentials.app_password()
    ))
}

/// Returns the `Authorization` header value for `credentials`.
#[must_use]
pub fn authorization_header_value(credentials: &Credentials) -> String {
    format!("Basic {}", basic_token(credentials))
}

/// Probes Basic credentials against the current-user endpoint.
#[derive(Debug, Clone)]
pub struct BasicAuthProbe {
    client: Client,
    url: String,
    timeout: Duration,
}

impl BasicAuthProbe {
    /// Creates a probe for the configured site with a per-request timeout.
    #[must_use]
    pub fn new(client: Client, config: &SiteConfig, timeout: Duration) -> Self {
        Self {
            client,
            url: config.endpoint(USERS_ME_PATH),
            timeout,
        }
    }

    /// Returns the probed endpoint.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the user profile when the site answers 200.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AuthRejected`] for any non-200 status and
    /// [`AuthError::Unreachable`] when the request fails.
    #[instrument(
        skip(self, credentials),
        fields(url = %self.url, user = %credentials.username(), password = %credentials.masked_password())
    )]
    pub async fn probe(&self, credentials: &Credentials) -> Result<UserProfile, AuthError> {
        let response = self
            .client
            .get(&self.url)
            .header(AUTHORIZATION, authorization_header_value(credentials))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|error| AuthError::unreachable(&self.url, &error))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| AuthError::unreachable(&self.url, &error))?;

        if status != StatusCode::OK {
            if status == StatusCode::UNAUTHORIZED {
                warn!(
                    "Basic authentication rejected. Check that the username is exact (case \
                     sensitive), that the application password has no quotes or extra spaces, \
                     and consider generating a new application password"
                );
            }
            return Err(AuthError::rejected(
                Some(status.as_u16()),
                body_excerpt(&body),
            ));
        }

        let profile = serde_json::from_str::<UserProfile>(&body).unwrap_or_else(|error| {
            warn!(error = %error, "Basic auth succeeded but the profile could not be parsed");
            UserProfile::default()
        });
        info!(
            user = %profile.display_label(),
            roles = %profile.roles_label(),
            can_create_posts = profile.can_create_posts(),
            "Basic authentication succeeded"
        );
        if !profile.can_create_posts() {
            warn!("Account lacks publish_posts/edit_posts; post creation will likely fail");
        }
        Ok(profile)
    }
}

fn body_excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(BODY_EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_token_encodes_username_and_password() {
        let credentials = Credentials::new("admin", "secret");
        assert_eq!(basic_token(&credentials), "YWRtaW46c2VjcmV0");
        assert_eq!(
            authorization_header_value(&credentials),
            "Basic YWRtaW46c2VjcmV0"
        );
    }

    #[test]
    fn test_basic_token_keeps_application_password_spaces() {
        let credentials = Credentials::new("a", "b c");
        assert_eq!(basic_token(&credentials), STANDARD.encode("a:b c"));
    }

    #[test]
    fn test_body_excerpt() {
        assert_eq!(body_excerpt("  "), "empty response body");
        assert_eq!(body_excerpt(&"y".repeat(400)).len(), BODY_EXCERPT_CHARS);
    }
}
