//! Scripted form login against `wp-login.php`.
//!
//! The flow is `FetchLoginPage -> ScrapeForm -> SubmitCredentials ->
//! InterpretResult`. Redirects are never followed: the `Location` of the POST
//! response is what tells success apart from failure.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, LOCATION};
use reqwest::{Client, StatusCode};
use tracing::{debug, info, instrument, warn};

use super::form::{compile_static_regex, html_unescape_basic};
use super::{AuthError, CookieJar, LoginFormSnapshot};
use crate::config::{Credentials, SiteConfig};

/// Body markers left by security plugins that demand an extra verification step.
pub const SECURITY_CHALLENGE_MARKERS: &[&str] = &["wfls-captcha-verify", "verification is required"];

/// Path segment a successful login redirects into.
pub const ADMIN_PATH_MARKER: &str = "wp-admin";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const DETAIL_MAX_CHARS: usize = 300;

static LOGIN_ERROR_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"(?is)<div\b[^>]*\bid\s*=\s*["']?login_error["']?[^>]*>(.*?)</div>"#)
});
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"(?s)<[^>]*>"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"\s+"));

/// Terminal state of a credential login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Redirected into the admin area; holds the `Set-Cookie` values of the login response.
    Success(CookieJar),
    /// A security plugin interposed a verification step.
    SecurityChallenge {
        /// The marker found in the response body.
        marker: String,
    },
    /// Rejected credentials, an unexpected response, or a network failure.
    Failure(AuthError),
}

/// The parts of the login POST response needed to classify it.
#[derive(Debug, Clone, Default)]
pub struct LoginResponse {
    /// HTTP status code.
    pub status: u16,
    /// `Location` header, when present.
    pub location: Option<String>,
    /// `Set-Cookie` values issued by the response.
    pub cookies: CookieJar,
    /// Response body text.
    pub body: String,
}

/// Performs the form-based login for one site.
#[derive(Debug, Clone)]
pub struct CredentialLogin {
    client: Client,
    login_url: String,
}

impl CredentialLogin {
    /// Creates a login flow for the configured site.
    ///
    /// `client` must not follow redirects; its request timeout bounds both
    /// the page fetch and the credential POST.
    #[must_use]
    pub fn new(client: Client, config: &SiteConfig) -> Self {
        Self {
            client,
            login_url: config.login_url(),
        }
    }

    /// Returns the login endpoint.
    #[must_use]
    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    /// Runs the full login sequence. Never retries.
    #[instrument(skip(self, credentials), fields(url = %self.login_url, user = %credentials.username()))]
    pub async fn login(&self, credentials: &Credentials) -> LoginOutcome {
        let (pre_auth, form) = match self.fetch_login_page().await {
            Ok(page) => page,
            Err(error) => return LoginOutcome::Failure(error),
        };
        debug!(
            pre_auth_cookies = pre_auth.len(),
            fields = ?form.names().collect::<Vec<_>>(),
            "Login form scraped"
        );

        let body = form.with_credentials(credentials).to_form_body();
        let response = match self.submit(&pre_auth, body).await {
            Ok(response) => response,
            Err(error) => return LoginOutcome::Failure(error),
        };

        let outcome = interpret_login_response(response);
        match &outcome {
            LoginOutcome::Success(jar) => info!(cookies = jar.len(), "Login succeeded"),
            LoginOutcome::SecurityChallenge { marker } => {
                warn!(marker = %marker, "Security challenge detected on login");
            }
            LoginOutcome::Failure(error) => warn!(error = %error, "Login failed"),
        }
        outcome
    }

    async fn fetch_login_page(&self) -> Result<(CookieJar, LoginFormSnapshot), AuthError> {
        let response = self
            .client
            .get(&self.login_url)
            .send()
            .await
            .map_err(|error| self.network_failure(&error))?;

        let status = response.status();
        if !status.is_success() {
            log_error_headers(status, response.headers());
            return Err(AuthError::unreachable_with(
                &self.login_url,
                format!("login page returned HTTP {}", status.as_u16()),
            ));
        }

        let pre_auth = CookieJar::from_set_cookie_headers(response.headers());
        let html = response
            .text()
            .await
            .map_err(|error| self.network_failure(&error))?;
        Ok((pre_auth, LoginFormSnapshot::scrape(&html)))
    }

    async fn submit(&self, pre_auth: &CookieJar, body: String) -> Result<LoginResponse, AuthError> {
        let mut request = self
            .client
            .post(&self.login_url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body);
        if !pre_auth.is_empty() {
            request = request.header(COOKIE, pre_auth.header_value());
        }

        let response = request
            .send()
            .await
            .map_err(|error| self.network_failure(&error))?;

        let status = response.status();
        if status.as_u16() >= 400 {
            log_error_headers(status, response.headers());
        }
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let cookies = CookieJar::from_set_cookie_headers(response.headers());
        let body = response
            .text()
            .await
            .map_err(|error| self.network_failure(&error))?;

        Ok(LoginResponse {
            status: status.as_u16(),
            location,
            cookies,
            body,
        })
    }

    fn network_failure(&self, error: &reqwest::Error) -> AuthError {
        warn!(
            error = %error,
            status = ?error.status().map(|s| s.as_u16()),
            "Login request failed"
        );
        AuthError::unreachable(&self.login_url, error)
    }
}

/// Classifies the login POST response.
///
/// Success requires a redirect whose target path is inside `wp-admin` and at
/// least one issued cookie. A 200 is never success. Challenge markers are
/// checked regardless of status.
#[must_use]
pub fn interpret_login_response(response: LoginResponse) -> LoginOutcome {
    let is_redirect = (300..400).contains(&response.status);
    if is_redirect && response.location.as_deref().is_some_and(is_admin_location) {
        if response.cookies.is_empty() {
            return LoginOutcome::Failure(AuthError::rejected(
                Some(response.status),
                "login redirected to wp-admin without issuing session cookies",
            ));
        }
        return LoginOutcome::Success(response.cookies);
    }

    if let Some(marker) = find_challenge_marker(&response.body) {
        return LoginOutcome::SecurityChallenge {
            marker: marker.to_string(),
        };
    }

    let detail = extract_login_error(&response.body).unwrap_or_else(|| match &response.location {
        Some(location) if is_redirect => format!("redirected to {location} instead of wp-admin"),
        _ => "login did not redirect to wp-admin".to_string(),
    });
    LoginOutcome::Failure(AuthError::rejected(Some(response.status), detail))
}

/// Returns the first security challenge marker found in `body`.
#[must_use]
pub fn find_challenge_marker(body: &str) -> Option<&'static str> {
    let lowered = body.to_lowercase();
    SECURITY_CHALLENGE_MARKERS
        .iter()
        .copied()
        .find(|marker| lowered.contains(marker))
}

/// Extracts the text of WordPress's `#login_error` block.
#[must_use]
pub fn extract_login_error(body: &str) -> Option<String> {
    let inner = LOGIN_ERROR_RE.captures(body)?.get(1)?.as_str();
    let text = TAG_RE.replace_all(inner, " ");
    let text = html_unescape_basic(&text);
    let text = WHITESPACE_RE.replace_all(text.trim(), " ");
    if text.is_empty() {
        return None;
    }
    Some(text.chars().take(DETAIL_MAX_CHARS).collect())
}

fn is_admin_location(location: &str) -> bool {
    location
        .split('?')
        .next()
        .is_some_and(|path| path.contains(ADMIN_PATH_MARKER))
}

fn log_error_headers(status: StatusCode, headers: &HeaderMap) {
    let names: Vec<&str> = headers.keys().map(reqwest::header::HeaderName::as_str).collect();
    debug!(status = status.as_u16(), headers = ?names, "Login endpoint returned an error status");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jar(cookies: &[&str]) -> CookieJar {
        CookieJar::from_cookies(cookies.iter().map(|c| (*c).to_string()).collect())
    }

    fn redirect(location: &str, cookies: &[&str]) -> LoginResponse {
        LoginResponse {
            status: 302,
            location: Some(location.to_string()),
            cookies: jar(cookies),
            body: String::new(),
        }
    }

    fn page(status: u16, body: &str) -> LoginResponse {
        LoginResponse {
            status,
            body: body.to_string(),
            ..LoginResponse::default()
        }
    }

    #[test]
    fn test_redirect_to_admin_with_cookies_is_success() {
        let outcome = interpret_login_response(redirect(
            "https://example.com/wp-admin/",
            &["wordpress_sec_x=a", "wordpress_logged_in_x=b"],
        ));
        assert_eq!(
            outcome,
            LoginOutcome::Success(jar(&["wordpress_sec_x=a", "wordpress_logged_in_x=b"]))
        );
    }

    #[test]
    fn test_redirect_to_admin_without_cookies_is_failure() {
        let outcome = interpret_login_response(redirect("https://example.com/wp-admin/", &[]));
        assert!(matches!(
            outcome,
            LoginOutcome::Failure(AuthError::AuthRejected { status: Some(302), .. })
        ));
    }

    #[test]
    fn test_redirect_back_to_login_with_admin_query_is_failure() {
        let outcome = interpret_login_response(redirect(
            "https://example.com/wp-login.php?redirect_to=https%3A%2F%2Fexample.com%2Fwp-admin%2F&reauth=1",
            &["wordpress_test_cookie=WP"],
        ));
        let LoginOutcome::Failure(error) = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert!(error.to_string().contains("instead of wp-admin"));
    }

    #[test]
    fn test_ok_status_without_redirect_is_never_success() {
        let outcome = interpret_login_response(page(200, "<html>Dashboard wp-admin</html>"));
        assert!(matches!(
            outcome,
            LoginOutcome::Failure(AuthError::AuthRejected { status: Some(200), .. })
        ));
    }

    #[test]
    fn test_verification_required_is_security_challenge() {
        let body = "<p>Additional verification is required for login. Please check your email.</p>";
        assert_eq!(
            interpret_login_response(page(200, body)),
            LoginOutcome::SecurityChallenge {
                marker: "verification is required".to_string()
            }
        );
    }

    #[test]
    fn test_captcha_marker_is_detected_case_insensitively_on_error_status() {
        let body = r#"<input type="hidden" name="WFLS-CAPTCHA-VERIFY" value="1">"#;
        assert_eq!(
            interpret_login_response(page(403, body)),
            LoginOutcome::SecurityChallenge {
                marker: "wfls-captcha-verify".to_string()
            }
        );
    }

    #[test]
    fn test_login_error_text_becomes_diagnostic() {
        let body = r#"<div id="login_error" class="notice notice-error">	<strong>Error:</strong> The password you entered for the username <strong>admin</strong> is incorrect. <a href="/wp-login.php?action=lostpassword">Lost your password?</a><br />
</div>"#;
        let LoginOutcome::Failure(error) = interpret_login_response(page(200, body)) else {
            panic!("expected failure");
        };
        assert_eq!(
            error,
            AuthError::rejected(
                Some(200),
                "Error: The password you entered for the username admin is incorrect. Lost your password?"
            )
        );
    }

    #[test]
    fn test_extract_login_error_absent_or_empty() {
        assert_eq!(extract_login_error("<div id=\"login\"></div>"), None);
        assert_eq!(extract_login_error("<div id=\"login_error\">  </div>"), None);
    }

    #[test]
    fn test_extract_login_error_decodes_entities() {
        assert_eq!(
            extract_login_error("<div id='login_error'>Too many attempts &amp; locked</div>"),
            Some("Too many attempts & locked".to_string())
        );
    }
}
