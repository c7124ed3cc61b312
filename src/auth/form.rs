//! Login form scraping.
//!
//! Field names on the login form are not known ahead of time: security
//! plugins add nonces and token fields of their own. The snapshot therefore
//! keeps every `<input name=...>` of the login form as an ordered string map
//! and only overrides the conventional credential fields.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::Credentials;

/// Conventional WordPress username field.
pub const USERNAME_FIELD: &str = "log";
/// Conventional WordPress password field.
pub const PASSWORD_FIELD: &str = "pwd";

/// Compiles a regex at static init; panics on invalid pattern.
pub(crate) fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

static FORM_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?is)<form\b([^>]*)>(.*?)</form>"));
static INPUT_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?is)<input\b[^>]*>"));
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(
        r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#,
    )
});

/// Input fields scraped from the login page right before submission.
///
/// Field order follows the page; setting an existing name replaces its value
/// in place. Values are redacted in Debug output.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LoginFormSnapshot {
    fields: Vec<(String, String)>,
}

impl LoginFormSnapshot {
    /// Scrapes every named `<input>` of the login form in `html`.
    ///
    /// The login form is the one with `id="loginform"`, posting to
    /// `wp-login.php`, or containing the username field; failing that the
    /// first form, and without any form the whole page. Inputs without a
    /// `value` attribute map to an empty string.
    #[must_use]
    pub fn scrape(html: &str) -> Self {
        let mut snapshot = Self::default();
        for tag in INPUT_TAG_RE.find_iter(select_login_form(html)) {
            let attrs = tag_attributes(tag.as_str());
            let Some(name) = attr_value(&attrs, "name").filter(|n| !n.is_empty()) else {
                continue;
            };
            let value = attr_value(&attrs, "value").unwrap_or_default();
            snapshot.set(html_unescape_basic(name), html_unescape_basic(value));
        }
        snapshot
    }

    /// Sets a field, replacing an existing value in place or appending.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(field) => field.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Overrides the username and password fields with `credentials`.
    #[must_use]
    pub fn with_credentials(mut self, credentials: &Credentials) -> Self {
        self.set(USERNAME_FIELD, credentials.username());
        self.set(PASSWORD_FIELD, credentials.app_password());
        self
    }

    /// Returns a field value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates field names in form order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when no field was scraped or set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Encodes all fields as an `application/x-www-form-urlencoded` body.
    #[must_use]
    pub fn to_form_body(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.fields.iter())
            .finish()
    }
}

impl fmt::Debug for LoginFormSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginFormSnapshot")
            .field("fields", &self.names().collect::<Vec<_>>())
            .field("values", &"[REDACTED]")
            .finish()
    }
}

fn select_login_form(html: &str) -> &str {
    let mut first_form: Option<&str> = None;
    for captures in FORM_RE.captures_iter(html) {
        let open_tag = captures.get(1).map_or("", |m| m.as_str());
        let body = captures.get(2).map_or("", |m| m.as_str());
        if is_login_form(open_tag, body) {
            return body;
        }
        first_form.get_or_insert(body);
    }
    first_form.unwrap_or(html)
}

fn is_login_form(open_tag: &str, body: &str) -> bool {
    let attrs = tag_attributes(open_tag);
    attr_value(&attrs, "id").is_some_and(|id| id.eq_ignore_ascii_case("loginform"))
        || attr_value(&attrs, "action").is_some_and(|action| action.contains("wp-login.php"))
        || INPUT_TAG_RE.find_iter(body).any(|tag| {
            attr_value(&tag_attributes(tag.as_str()), "name") == Some(USERNAME_FIELD)
        })
}

fn tag_attributes(tag: &str) -> Vec<(String, &str)> {
    ATTR_RE
        .captures_iter(tag)
        .filter_map(|caps| {
            let key = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or("", |m| m.as_str());
            Some((key, value))
        })
        .collect()
}

fn attr_value<'a>(attrs: &[(String, &'a str)], key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| *value)
}

/// Decodes the handful of entities WordPress emits in attributes and messages.
pub(crate) fn html_unescape_basic(value: &str) -> String {
    value
        .replace("&#038;", "&")
        .replace("&#38;", "&")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", "\u{00a0}")
        .replace("&amp;", "&")
}
