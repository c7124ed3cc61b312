//! Shared HTTP client construction policy.
//!
//! Every client built here keeps the same defaults: connect and request
//! timeouts, the project User-Agent, and gzip. The authentication client
//! never follows redirects: the auth flow reads redirect targets itself (a
//! redirect to the login page means an expired session, a redirect to
//! `wp-admin` means a successful login). The connectivity check client
//! follows a bounded number of redirects, since healthy sites answer
//! `/wp-json` with a slash redirect or upgrade http to https.

use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder};
use tracing::instrument;

use crate::config::HttpTimeouts;
use crate::user_agent;

/// Redirect hops the connectivity check client follows before giving up.
pub const MAX_CHECK_REDIRECTS: usize = 5;

/// Builds the client used for authentication and REST calls.
///
/// The client-wide request timeout is the auth timeout; shorter check
/// timeouts are applied per request.
///
/// # Errors
///
/// Returns the underlying [`reqwest::Error`] when the TLS backend or resolver
/// cannot be initialized.
#[instrument(level = "debug")]
pub fn build_http_client(timeouts: &HttpTimeouts) -> Result<Client, reqwest::Error> {
    base_builder(timeouts).build()
}

/// Builds the client used by the unauthenticated connectivity check.
///
/// Follows up to [`MAX_CHECK_REDIRECTS`] redirects and uses the check
/// timeout for every request.
///
/// # Errors
///
/// Returns the underlying [`reqwest::Error`] when the TLS backend or resolver
/// cannot be initialized.
#[instrument(level = "debug")]
pub fn build_check_client(timeouts: &HttpTimeouts) -> Result<Client, reqwest::Error> {
    base_builder(timeouts)
        .timeout(timeouts.check_request)
        .redirect(Policy::limited(MAX_CHECK_REDIRECTS))
        .build()
}

fn base_builder(timeouts: &HttpTimeouts) -> ClientBuilder {
    Client::builder()
        .connect_timeout(timeouts.connect)
        .timeout(timeouts.auth_request)
        .user_agent(user_agent::default_user_agent())
        .redirect(Policy::none())
        .gzip(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client_with_default_timeouts() {
        assert!(build_http_client(&HttpTimeouts::default()).is_ok());
    }

    #[test]
    fn test_build_http_client_with_custom_auth_timeout() {
        assert!(build_http_client(&HttpTimeouts::with_auth_timeout_secs(120)).is_ok());
    }

    #[test]
    fn test_build_check_client_with_default_timeouts() {
        assert!(build_check_client(&HttpTimeouts::default()).is_ok());
    }
}
