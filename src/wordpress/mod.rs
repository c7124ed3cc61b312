//! WordPress REST collaborator.
//!
//! Consumes a [`crate::Session`] from the acquirer: cookie sessions send the
//! `Cookie` header plus an `X-WP-Nonce` on mutating calls, Basic sessions
//! send `Authorization`.

mod client;
mod connectivity;
mod error;
mod types;

pub use client::{NONCE_HEADER, POSTS_PATH, REST_NONCE_PATH, WordPressClient};
pub use connectivity::{REST_INDEX_PATH, WP_V2_NAMESPACE, check_site};
pub use error::{CheckStep, WordPressError};
pub use types::{
    CreatedPost, NewPost, POST_CAPABILITIES, ParsePostStatusError, PostStatus, PostSummary,
    RenderedText, SiteReport, UserProfile,
};
