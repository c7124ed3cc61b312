//! The session handle returned by the acquirer.

use std::fmt;

use reqwest::RequestBuilder;
use reqwest::header::{AUTHORIZATION, COOKIE};

use super::basic::authorization_header_value;
use super::{AuthMethod, CookieJar};
use crate::config::Credentials;

/// An authenticated identity usable for REST calls.
///
/// Exactly one variant is active per run. Cookie sessions are preferred;
/// Basic sessions are never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// Browser-equivalent cookie session.
    Cookie(CookieJar),
    /// HTTP Basic with an application password.
    Basic(Credentials),
}

/// Session variant without its secret payload, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    /// [`Session::Cookie`].
    Cookie,
    /// [`Session::Basic`].
    Basic,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cookie => f.write_str("cookie"),
            Self::Basic => f.write_str("basic"),
        }
    }
}

impl Session {
    /// Adds the session's credentials to a request.
    #[must_use]
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Cookie(jar) => request.header(COOKIE, jar.header_value()),
            Self::Basic(credentials) => {
                request.header(AUTHORIZATION, authorization_header_value(credentials))
            }
        }
    }

    /// Returns the session variant.
    #[must_use]
    pub fn kind(&self) -> SessionKind {
        match self {
            Self::Cookie(_) => SessionKind::Cookie,
            Self::Basic(_) => SessionKind::Basic,
        }
    }

    /// Returns the cookie jar of a cookie session.
    #[must_use]
    pub fn cookie_jar(&self) -> Option<&CookieJar> {
        match self {
            Self::Cookie(jar) => Some(jar),
            Self::Basic(_) => None,
        }
    }
}

/// A session together with the tier that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredSession {
    /// The usable session.
    pub session: Session,
    /// The tier that produced it.
    pub method: AuthMethod,
}
