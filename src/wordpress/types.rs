//! REST payload types.
//!
//! Response types deserialize leniently: every field WordPress may omit
//! (depending on context and plugins) is defaulted rather than rejected.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Capabilities that allow creating posts.
pub const POST_CAPABILITIES: &[&str] = &["publish_posts", "edit_posts"];

/// The authenticated user, from `/wp-json/wp/v2/users/me`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserProfile {
    /// User ID.
    #[serde(default)]
    pub id: Option<u64>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// URL slug.
    #[serde(default)]
    pub slug: Option<String>,
    /// Role names (only present in `edit` context).
    #[serde(default)]
    pub roles: Vec<String>,
    /// Capability flags (only present in `edit` context).
    #[serde(default)]
    pub capabilities: HashMap<String, serde_json::Value>,
}

impl UserProfile {
    /// Returns true when the user holds `publish_posts` or `edit_posts`.
    #[must_use]
    pub fn can_create_posts(&self) -> bool {
        POST_CAPABILITIES.iter().any(|capability| {
            self.capabilities
                .get(*capability)
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false)
        })
    }

    /// Returns `"name (slug)"`, or whatever part is known.
    #[must_use]
    pub fn display_label(&self) -> String {
        match (&self.name, &self.slug) {
            (Some(name), Some(slug)) => format!("{name} ({slug})"),
            (Some(name), None) => name.clone(),
            (None, Some(slug)) => slug.clone(),
            (None, None) => "unknown user".to_string(),
        }
    }

    /// Returns the roles joined with `", "`, or `"unknown"`.
    #[must_use]
    pub fn roles_label(&self) -> String {
        if self.roles.is_empty() {
            "unknown".to_string()
        } else {
            self.roles.join(", ")
        }
    }
}

/// Publication status of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Saved but not published.
    #[default]
    Draft,
    /// Publicly visible.
    Publish,
    /// Awaiting review.
    Pending,
    /// Visible to privileged users only.
    Private,
}

impl PostStatus {
    /// Every accepted status.
    pub const ALL: [Self; 4] = [Self::Draft, Self::Publish, Self::Pending, Self::Private];

    /// Returns the REST API value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Publish => "publish",
            Self::Pending => "pending",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unknown post status string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown post status '{0}' (expected draft, publish, pending, or private)")]
pub struct ParsePostStatusError(String);

impl FromStr for PostStatus {
    type Err = ParsePostStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParsePostStatusError(value.to_string()))
    }
}

/// Body of a create-post request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPost {
    /// Post title.
    pub title: String,
    /// Post content (HTML allowed).
    pub content: String,
    /// Publication status.
    pub status: PostStatus,
}

impl NewPost {
    /// Creates a post body.
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>, status: PostStatus) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            status,
        }
    }
}

/// The part of a created post the caller needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedPost {
    /// New post ID.
    pub id: u64,
    /// Permalink (or preview link for drafts).
    #[serde(default)]
    pub link: String,
}

/// A rendered text field (`{"rendered": "..."}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RenderedText {
    /// Rendered HTML.
    #[serde(default)]
    pub rendered: String,
}

/// One entry of a post listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostSummary {
    /// Post ID.
    pub id: u64,
    /// Permalink.
    #[serde(default)]
    pub link: String,
    /// Status string as reported by the site.
    #[serde(default)]
    pub status: String,
    /// Rendered title.
    #[serde(default)]
    pub title: RenderedText,
}

/// Result of a successful connectivity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteReport {
    /// HTTP status of the site root.
    pub root_status: u16,
    /// Site name from the REST index.
    pub site_name: Option<String>,
    /// Whether the REST index lists the `wp/v2` namespace.
    pub has_wp_v2: bool,
    /// Number of posts returned by the first page of the posts endpoint.
    pub visible_posts: usize,
}

/// The fields of the `/wp-json` index that the check reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RestIndex {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub namespaces: Vec<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_profile_parses_edit_context() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"id":1,"name":"Admin","slug":"admin","roles":["administrator"],
                "capabilities":{"edit_posts":true,"publish_posts":true,"level_10":true},
                "avatar_urls":{}}"#,
        )
        .unwrap();
        assert_eq!(profile.display_label(), "Admin (admin)");
        assert_eq!(profile.roles_label(), "administrator");
        assert!(profile.can_create_posts());
    }

    #[test]
    fn test_user_profile_tolerates_view_context() {
        let profile: UserProfile = serde_json::from_str(r#"{"id":7,"name":"Guest"}"#).unwrap();
        assert_eq!(profile.roles_label(), "unknown");
        assert!(!profile.can_create_posts());
    }

    #[test]
    fn test_can_create_posts_requires_true_flag() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"capabilities":{"edit_posts":false,"publish_posts":"yes","read":true}}"#,
        )
        .unwrap();
        assert!(!profile.can_create_posts());
    }

    #[test]
    fn test_post_status_from_str_and_display() {
        for status in PostStatus::ALL {
            assert_eq!(status.to_string().parse::<PostStatus>().unwrap(), status);
        }
        assert_eq!("PUBLISH".parse::<PostStatus>().unwrap(), PostStatus::Publish);
        assert!("scheduled".parse::<PostStatus>().is_err());
    }

    #[test]
    fn test_new_post_serializes_lowercase_status() {
        let body = serde_json::to_value(NewPost::new("Hello", "<p>World</p>", PostStatus::Draft))
            .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"title": "Hello", "content": "<p>World</p>", "status": "draft"})
        );
    }

    #[test]
    fn test_created_post_ignores_extra_fields() {
        let created: CreatedPost = serde_json::from_str(
            r#"{"id":42,"link":"https://example.com/?p=42","status":"draft","title":{"raw":"x"}}"#,
        )
        .unwrap();
        assert_eq!(created.id, 42);
        assert_eq!(created.link, "https://example.com/?p=42");
    }
}
