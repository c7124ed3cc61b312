//! Site configuration sourced from the environment.
//!
//! The configuration is built once per run and never mutated afterwards.
//! `WP_URL` is required; `WP_USERNAME` and `WP_APP_PASSWORD` form an optional
//! pair that enables form login and the Basic Auth fallback.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Environment variable holding the site URL.
pub const ENV_URL: &str = "WP_URL";
/// Environment variable holding the login username.
pub const ENV_USERNAME: &str = "WP_USERNAME";
/// Environment variable holding the application password.
pub const ENV_APP_PASSWORD: &str = "WP_APP_PASSWORD";

/// Default connect timeout for every request (10 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default timeout for login and cookie validation requests (30 seconds).
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 30;

/// Timeout for reachability, Basic Auth, and REST checks (10 seconds).
pub const CHECK_TIMEOUT_SECS: u64 = 10;

/// Errors raised while building the site configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required setting is absent or blank.
    #[error("{name} is not set; add {name}={example} to your environment")]
    Missing {
        /// Environment variable name.
        name: &'static str,
        /// Example value shown to the operator.
        example: &'static str,
    },

    /// The site URL cannot be parsed as an http(s) URL.
    #[error("{name} is not a valid http(s) URL: {value}")]
    InvalidUrl {
        /// Environment variable name.
        name: &'static str,
        /// The offending value.
        value: String,
    },
}

/// Username and application password pair.
///
/// The password is redacted in Debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    app_password: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, app_password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            app_password: app_password.into(),
        }
    }

    /// Returns the login username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the application password.
    ///
    /// Sensitive: never log the return value.
    #[must_use]
    pub fn app_password(&self) -> &str {
        &self.app_password
    }

    /// Returns the password masked down to its last four characters.
    #[must_use]
    pub fn masked_password(&self) -> String {
        let chars: Vec<char> = self.app_password.chars().collect();
        let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
        format!("******{tail}")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("app_password", &"[REDACTED]")
            .finish()
    }
}

/// Immutable configuration for the target site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    base_url: String,
    credentials: Option<Credentials>,
}

impl SiteConfig {
    /// Builds a configuration from a raw site URL and optional credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] for a blank URL and
    /// [`ConfigError::InvalidUrl`] when it is not an http(s) URL.
    pub fn new(raw_url: &str, credentials: Option<Credentials>) -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(raw_url);
        if base_url.is_empty() {
            return Err(ConfigError::Missing {
                name: ENV_URL,
                example: "https://your-wordpress-site.com",
            });
        }

        let parsed = Url::parse(&base_url).map_err(|_| ConfigError::InvalidUrl {
            name: ENV_URL,
            value: base_url.clone(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                name: ENV_URL,
                value: base_url,
            });
        }

        Ok(Self {
            base_url,
            credentials,
        })
    }

    /// Builds the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `WP_URL` is absent or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Blank values count as absent. Credentials are only configured when both
    /// the username and the application password are present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `WP_URL` is absent or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let raw_url = non_blank(ENV_URL).ok_or(ConfigError::Missing {
            name: ENV_URL,
            example: "https://your-wordpress-site.com",
        })?;

        let credentials = match (non_blank(ENV_USERNAME), non_blank(ENV_APP_PASSWORD)) {
            (Some(username), Some(app_password)) => Some(Credentials::new(username, app_password)),
            _ => None,
        };

        Self::new(&raw_url, credentials)
    }

    /// Returns the normalized base URL (no `/wp-admin` suffix, no trailing slash).
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the configured credentials, if any.
    #[must_use]
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Joins a site-relative path (starting with `/`) onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Returns the form login endpoint.
    #[must_use]
    pub fn login_url(&self) -> String {
        self.endpoint("/wp-login.php")
    }

    /// Returns the admin dashboard URL.
    #[must_use]
    pub fn admin_url(&self) -> String {
        self.endpoint("/wp-admin/")
    }
}

/// Normalizes a site URL: everything from `/wp-admin` on is dropped, then
/// trailing slashes are removed.
#[must_use]
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let site = trimmed
        .find("/wp-admin")
        .map_or(trimmed, |index| &trimmed[..index]);
    site.trim_end_matches('/').to_string()
}

/// Timeouts applied to outgoing requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// TCP/TLS connect timeout for every request.
    pub connect: Duration,
    /// Whole-request timeout for login and cookie validation.
    pub auth_request: Duration,
    /// Whole-request timeout for reachability, Basic Auth, and REST checks.
    pub check_request: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            auth_request: Duration::from_secs(DEFAULT_AUTH_TIMEOUT_SECS),
            check_request: Duration::from_secs(CHECK_TIMEOUT_SECS),
        }
    }
}

impl HttpTimeouts {
    /// Default timeouts with a custom auth request timeout.
    #[must_use]
    pub fn with_auth_timeout_secs(auth_timeout_secs: u64) -> Self {
        Self {
            auth_request: Duration::from_secs(auth_timeout_secs),
            ..Self::default()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_normalize_base_url_strips_wp_admin_suffix() {
        assert_eq!(
            normalize_base_url("https://example.com/wp-admin/"),
            "https://example.com"
        );
        assert_eq!(
            normalize_base_url("https://example.com/blog/wp-admin/post-new.php"),
            "https://example.com/blog"
        );
    }

    #[test]
    fn test_normalize_base_url_strips_trailing_slash() {
        assert_eq!(normalize_base_url("https://example.com/"), "https://example.com");
        assert_eq!(normalize_base_url("https://example.com//"), "https://example.com");
        assert_eq!(normalize_base_url("  https://example.com  "), "https://example.com");
    }

    #[test]
    fn test_normalize_base_url_leaves_clean_url_untouched() {
        assert_eq!(normalize_base_url("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_from_lookup_requires_url() {
        let result = SiteConfig::from_lookup(lookup_from(&[("WP_USERNAME", "admin")]));
        assert!(matches!(
            result,
            Err(ConfigError::Missing { name: "WP_URL", .. })
        ));
    }

    #[test]
    fn test_from_lookup_blank_url_counts_as_missing() {
        let result = SiteConfig::from_lookup(lookup_from(&[("WP_URL", "   ")]));
        assert!(matches!(result, Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_from_lookup_rejects_non_http_url() {
        let result = SiteConfig::from_lookup(lookup_from(&[("WP_URL", "ftp://example.com")]));
        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));

        let result = SiteConfig::from_lookup(lookup_from(&[("WP_URL", "not a url")]));
        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn test_from_lookup_with_full_credentials() {
        let config = SiteConfig::from_lookup(lookup_from(&[
            ("WP_URL", "https://example.com/wp-admin"),
            ("WP_USERNAME", "editor"),
            ("WP_APP_PASSWORD", "abcd efgh ijkl"),
        ]))
        .unwrap();

        assert_eq!(config.base_url(), "https://example.com");
        let credentials = config.credentials().unwrap();
        assert_eq!(credentials.username(), "editor");
        assert_eq!(credentials.app_password(), "abcd efgh ijkl");
    }

    #[test]
    fn test_from_lookup_half_credentials_are_ignored() {
        let config = SiteConfig::from_lookup(lookup_from(&[
            ("WP_URL", "https://example.com"),
            ("WP_USERNAME", "editor"),
        ]))
        .unwrap();
        assert!(config.credentials().is_none());
    }

    #[test]
    fn test_endpoints_are_built_from_normalized_base() {
        let config = SiteConfig::new("https://example.com/", None).unwrap();
        assert_eq!(config.login_url(), "https://example.com/wp-login.php");
        assert_eq!(config.admin_url(), "https://example.com/wp-admin/");
        assert_eq!(
            config.endpoint("/wp-json/wp/v2/posts"),
            "https://example.com/wp-json/wp/v2/posts"
        );
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let credentials = Credentials::new("admin", "super-secret-pass");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("admin"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret-pass"));
    }

    #[test]
    fn test_masked_password_keeps_last_four() {
        assert_eq!(Credentials::new("a", "abcdefgh").masked_password(), "******efgh");
        assert_eq!(Credentials::new("a", "xy").masked_password(), "******xy");
    }

    #[test]
    fn test_http_timeouts_with_auth_timeout() {
        let timeouts = HttpTimeouts::with_auth_timeout_secs(45);
        assert_eq!(timeouts.auth_request, Duration::from_secs(45));
        assert_eq!(timeouts.check_request, Duration::from_secs(CHECK_TIMEOUT_SECS));
    }
}
