//! Error taxonomy for session acquisition.
//!
//! Every auth component returns these as typed outcomes instead of raising
//! past its boundary. Fields are owned strings so failures can be collected
//! into the per-tier ledger carried by [`AuthError::Fatal`].

use std::fmt;

use thiserror::Error;

/// The authentication tiers attempted by the session acquirer, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMethod {
    /// Cookies loaded from the persisted cookie file.
    SavedCookies,
    /// Scripted form login against `wp-login.php`.
    Login,
    /// Operator-pasted browser cookies.
    ManualCapture,
    /// HTTP Basic credentials (application password).
    BasicAuth,
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::SavedCookies => "saved cookies",
            Self::Login => "form login",
            Self::ManualCapture => "manual cookie capture",
            Self::BasicAuth => "basic auth",
        };
        f.write_str(label)
    }
}

/// One failed tier and why it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierFailure {
    /// The tier that was attempted.
    pub method: AuthMethod,
    /// The diagnostic it produced.
    pub error: AuthError,
}

impl TierFailure {
    /// Creates a ledger entry.
    #[must_use]
    pub fn new(method: AuthMethod, error: AuthError) -> Self {
        Self { method, error }
    }
}

/// Errors and non-success outcomes of the authentication flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Required URL or credentials are absent.
    #[error("configuration missing: {what}")]
    ConfigMissing {
        /// What is missing, named by its setting.
        what: String,
    },

    /// Network or timeout failure.
    #[error("cannot reach {url}: {message}")]
    Unreachable {
        /// The URL that failed.
        url: String,
        /// The underlying failure message.
        message: String,
    },

    /// The cookie validity heuristic failed.
    #[error("saved session is not valid: {reason}")]
    SessionInvalid {
        /// Why the session was judged invalid.
        reason: String,
    },

    /// A security plugin demanded an additional verification step.
    #[error("security challenge detected (marker: {marker})")]
    SecurityChallenge {
        /// The marker found in the login response.
        marker: String,
    },

    /// Credentials were rejected.
    #[error("authentication rejected{}: {detail}", status_suffix(.status))]
    AuthRejected {
        /// HTTP status, when a response was received.
        status: Option<u16>,
        /// Response detail (login error text or body excerpt).
        detail: String,
    },

    /// Manual cookie capture produced no session.
    #[error("manual cookie capture failed: {reason}")]
    ManualCaptureFailed {
        /// Why the capture produced nothing.
        reason: String,
    },

    /// Every fallback tier was exhausted.
    #[error("all authentication methods failed:{}", summarize_attempts(.attempts))]
    Fatal {
        /// Ledger of attempted tiers, in attempt order.
        attempts: Vec<TierFailure>,
    },
}

impl AuthError {
    /// Creates a missing-configuration error.
    pub fn config_missing(what: impl Into<String>) -> Self {
        Self::ConfigMissing { what: what.into() }
    }

    /// Creates an unreachable error from a request failure.
    pub fn unreachable(url: impl Into<String>, source: &reqwest::Error) -> Self {
        let message = if source.is_timeout() {
            format!("request timed out ({source})")
        } else {
            source.to_string()
        };
        Self::Unreachable {
            url: url.into(),
            message,
        }
    }

    /// Creates an unreachable error with a custom message.
    pub fn unreachable_with(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unreachable {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a session-invalid error.
    pub fn session_invalid(reason: impl Into<String>) -> Self {
        Self::SessionInvalid {
            reason: reason.into(),
        }
    }

    /// Creates a security-challenge outcome.
    pub fn security_challenge(marker: impl Into<String>) -> Self {
        Self::SecurityChallenge {
            marker: marker.into(),
        }
    }

    /// Creates an auth-rejected error.
    pub fn rejected(status: Option<u16>, detail: impl Into<String>) -> Self {
        Self::AuthRejected {
            status,
            detail: detail.into(),
        }
    }

    /// Creates a manual-capture failure.
    pub fn capture_failed(reason: impl Into<String>) -> Self {
        Self::ManualCaptureFailed {
            reason: reason.into(),
        }
    }

    /// Returns the tier ledger for [`AuthError::Fatal`], empty otherwise.
    #[must_use]
    pub fn attempts(&self) -> &[TierFailure] {
        match self {
            Self::Fatal { attempts } => attempts,
            _ => &[],
        }
    }

    /// Returns the diagnostic of the last attempted tier of a fatal outcome.
    #[must_use]
    pub fn last_diagnostic(&self) -> Option<&TierFailure> {
        self.attempts().last()
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|code| format!(" (HTTP {code})")).unwrap_or_default()
}

fn summarize_attempts(attempts: &[TierFailure]) -> String {
    attempts
        .iter()
        .map(|attempt| format!("\n  - {}: {}", attempt.method, attempt.error))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_rejected_display_with_and_without_status() {
        let with_status = AuthError::rejected(Some(401), "incorrect password");
        assert_eq!(
            with_status.to_string(),
            "authentication rejected (HTTP 401): incorrect password"
        );

        let without_status = AuthError::rejected(None, "no redirect");
        assert_eq!(
            without_status.to_string(),
            "authentication rejected: no redirect"
        );
    }

    #[test]
    fn test_fatal_display_lists_every_tier() {
        let fatal = AuthError::Fatal {
            attempts: vec![
                TierFailure::new(
                    AuthMethod::SavedCookies,
                    AuthError::session_invalid("redirected to login"),
                ),
                TierFailure::new(
                    AuthMethod::BasicAuth,
                    AuthError::rejected(Some(401), "invalid application password"),
                ),
            ],
        };

        let message = fatal.to_string();
        assert!(message.starts_with("all authentication methods failed:"));
        assert!(message.contains("saved cookies: saved session is not valid"));
        assert!(message.contains("basic auth: authentication rejected (HTTP 401)"));
    }

    #[test]
    fn test_last_diagnostic_is_final_tier() {
        let fatal = AuthError::Fatal {
            attempts: vec![
                TierFailure::new(AuthMethod::Login, AuthError::config_missing("WP_USERNAME")),
                TierFailure::new(
                    AuthMethod::BasicAuth,
                    AuthError::config_missing("WP_APP_PASSWORD"),
                ),
            ],
        };
        assert_eq!(
            fatal.last_diagnostic().map(|t| t.method),
            Some(AuthMethod::BasicAuth)
        );
        assert!(AuthError::session_invalid("x").last_diagnostic().is_none());
    }
}
