//! Saved-session validity heuristic.
//!
//! A session is valid when the admin dashboard, fetched with the session's
//! cookies and without following redirects, renders a link only logged-in
//! users see. A redirect (normally to `wp-login.php`) means the session expired.

use reqwest::Client;
use reqwest::header::{COOKIE, LOCATION};
use tracing::{debug, instrument};

use super::{AuthError, CookieJar};
use crate::config::SiteConfig;

/// Marker present only on pages rendered for an authenticated user.
pub const AUTHENTICATED_MARKER: &str = "wp-admin/profile.php";

/// Checks persisted cookies against the site's admin dashboard.
#[derive(Debug, Clone)]
pub struct CookieValidator {
    client: Client,
    admin_url: String,
}

impl CookieValidator {
    /// Creates a validator for the configured site.
    ///
    /// `client` must not follow redirects (see [`crate::build_http_client`]).
    #[must_use]
    pub fn new(client: Client, config: &SiteConfig) -> Self {
        Self {
            client,
            admin_url: config.admin_url(),
        }
    }

    /// Returns `Ok(())` when the jar still authenticates against the site.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SessionInvalid`] for an empty jar, a redirect, an
    /// error status, or a page without the authenticated marker, and
    /// [`AuthError::Unreachable`] when the request itself fails.
    #[instrument(skip(self, jar), fields(url = %self.admin_url, cookies = jar.len()))]
    pub async fn validate(&self, jar: &CookieJar) -> Result<(), AuthError> {
        if jar.is_empty() {
            return Err(AuthError::session_invalid("no saved cookies"));
        }

        let response = self
            .client
            .get(&self.admin_url)
            .header(COOKIE, jar.header_value())
            .send()
            .await
            .map_err(|error| AuthError::unreachable(&self.admin_url, &error))?;

        let status = response.status();
        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("<no location>")
                .to_string();
            return Err(AuthError::session_invalid(format!(
                "HTTP {} redirect to {location}",
                status.as_u16()
            )));
        }
        if !status.is_success() {
            return Err(AuthError::session_invalid(format!(
                "admin page returned HTTP {}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|error| AuthError::unreachable(&self.admin_url, &error))?;

        if is_authenticated_page(&body) {
            debug!("Authenticated marker found");
            Ok(())
        } else {
            Err(AuthError::session_invalid(
                "admin page did not contain the authenticated marker",
            ))
        }
    }
}

/// Returns true when `body` contains the authenticated-only marker.
#[must_use]
pub fn is_authenticated_page(body: &str) -> bool {
    body.contains(AUTHENTICATED_MARKER)
}
