//! Error types for the REST collaborator.

use std::fmt;

use thiserror::Error;

/// Steps of the connectivity check, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStep {
    /// The site root answers at all.
    Reachability,
    /// `/wp-json` serves the REST index.
    RestIndex,
    /// `/wp-json/wp/v2/posts` lists posts.
    PostsEndpoint,
}

impl fmt::Display for CheckStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Reachability => "site reachability",
            Self::RestIndex => "REST API index",
            Self::PostsEndpoint => "posts endpoint",
        };
        f.write_str(label)
    }
}

/// Errors from WordPress REST calls.
#[derive(Debug, Error)]
pub enum WordPressError {
    /// Network-level failure (DNS, connect, TLS, timeout).
    #[error("network error calling {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Unexpected HTTP status.
    #[error("HTTP {status} from {url}{}", body_suffix(.body))]
    HttpStatus {
        /// The URL that answered.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// Excerpt of the response body.
        body: String,
    },

    /// The response body could not be interpreted.
    #[error("invalid response from {url}: {message}")]
    InvalidResponse {
        /// The URL that answered.
        url: String,
        /// What was wrong with the body.
        message: String,
    },

    /// No REST nonce could be obtained for a cookie session.
    #[error("REST nonce unavailable: {reason}")]
    NonceUnavailable {
        /// Why the nonce could not be obtained.
        reason: String,
    },

    /// A connectivity check step failed; later steps were not run.
    #[error("{step} check failed: {source}")]
    CheckFailed {
        /// The failing step.
        step: CheckStep,
        /// The underlying failure.
        #[source]
        source: Box<WordPressError>,
    },
}

impl WordPressError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error with a body excerpt.
    pub fn http_status(url: impl Into<String>, status: u16, body: &str) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
            body: excerpt(body),
        }
    }

    /// Creates an invalid-response error.
    pub fn invalid_response(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a nonce-unavailable error.
    pub fn nonce_unavailable(reason: impl Into<String>) -> Self {
        Self::NonceUnavailable {
            reason: reason.into(),
        }
    }

    /// Wraps a failure with the check step it happened in.
    #[must_use]
    pub fn at_step(self, step: CheckStep) -> Self {
        Self::CheckFailed {
            step,
            source: Box::new(self),
        }
    }

    /// Returns the HTTP status, when the failure carried one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::CheckFailed { source, .. } => source.status(),
            _ => None,
        }
    }
}

const EXCERPT_MAX_CHARS: usize = 200;

/// Trims and truncates a response body for diagnostics.
pub(crate) fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= EXCERPT_MAX_CHARS {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(EXCERPT_MAX_CHARS).collect();
    cut.push_str("...");
    cut
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {body}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display_includes_body_excerpt() {
        let error = WordPressError::http_status(
            "https://example.com/wp-json/wp/v2/posts",
            403,
            r#"{"code":"rest_cookie_invalid_nonce"}"#,
        );
        let msg = error.to_string();
        assert!(msg.starts_with("HTTP 403 from https://example.com/wp-json/wp/v2/posts"));
        assert!(msg.contains("rest_cookie_invalid_nonce"));
        assert_eq!(error.status(), Some(403));
    }

    #[test]
    fn test_http_status_display_without_body() {
        let error = WordPressError::http_status("https://example.com", 500, "   ");
        assert_eq!(error.to_string(), "HTTP 500 from https://example.com");
    }

    #[test]
    fn test_excerpt_truncates_long_bodies() {
        let long = "x".repeat(500);
        let cut = excerpt(&long);
        assert_eq!(cut.chars().count(), EXCERPT_MAX_CHARS + 3);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_check_failed_names_step_and_keeps_status() {
        let error = WordPressError::http_status("https://example.com/wp-json", 404, "")
            .at_step(CheckStep::RestIndex);
        assert!(error.to_string().starts_with("REST API index check failed: HTTP 404"));
        assert_eq!(error.status(), Some(404));
    }
}
