//! In-memory cookie jar holding raw `name=value` session cookies.
//!
//! The jar preserves capture order and never deduplicates by name: a second
//! cookie with the same name is appended, not substituted. The jar is a plain
//! owned value; callers copy it out rather than sharing it mutably.

use std::fmt;

use reqwest::header::{HeaderMap, SET_COOKIE};

/// Ordered list of raw cookie strings.
///
/// Cookie values are redacted in Debug output; only names are shown.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: Vec<String>,
}

impl CookieJar {
    /// Creates an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a jar from an ordered list of `name=value` strings.
    #[must_use]
    pub fn from_cookies(cookies: Vec<String>) -> Self {
        Self { cookies }
    }

    /// Collects the `name=value` part of every `Set-Cookie` header, in header order.
    #[must_use]
    pub fn from_set_cookie_headers(headers: &HeaderMap) -> Self {
        let mut jar = Self::new();
        for value in headers.get_all(SET_COOKIE) {
            if let Ok(raw) = value.to_str() {
                jar.add_set_cookie(raw);
            }
        }
        jar
    }

    /// Appends a raw cookie string.
    pub fn add(&mut self, cookie: impl Into<String>) {
        self.cookies.push(cookie.into());
    }

    /// Appends the `name=value` part of a `Set-Cookie` header value.
    ///
    /// Returns `false` when the header has no cookie pair before its attributes.
    pub fn add_set_cookie(&mut self, header_value: &str) -> bool {
        match set_cookie_pair(header_value) {
            Some(pair) => {
                self.add(pair);
                true
            }
            None => false,
        }
    }

    /// Returns a copy of the ordered cookie list.
    #[must_use]
    pub fn serialize(&self) -> Vec<String> {
        self.cookies.clone()
    }

    /// Borrows the ordered cookie list.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.cookies
    }

    /// Returns the `Cookie` request header value (cookies joined with `"; "`).
    #[must_use]
    pub fn header_value(&self) -> String {
        self.cookies.join("; ")
    }

    /// Returns true when the jar holds no cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Number of cookies in the jar.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Iterates cookie names (the text before the first `=`), for logging.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cookies
            .iter()
            .map(|cookie| cookie.split_once('=').map_or(cookie.as_str(), |(name, _)| name))
    }
}

impl fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieJar")
            .field("names", &self.names().collect::<Vec<_>>())
            .field("values", &"[REDACTED]")
            .finish()
    }
}

/// Returns the trimmed text before the first `;` of a `Set-Cookie` value.
#[must_use]
pub fn set_cookie_pair(header_value: &str) -> Option<&str> {
    let pair = header_value.split(';').next().unwrap_or_default().trim();
    if pair.is_empty() { None } else { Some(pair) }
}
