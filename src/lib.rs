//! WordPress Auto-Post Core Library
//!
//! This library acquires an authenticated WordPress session for script-driven
//! clients that have no first-party OAuth flow, and uses that session to talk
//! to the WordPress REST API.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`auth`] - Session acquisition: cookie jar, persistence, validation,
//!   form login, manual cookie capture, Basic Auth fallback, and the
//!   orchestrating state machine
//! - [`config`] - Site configuration and HTTP timeout settings
//! - [`http_client`] - Shared HTTP client construction policy
//! - [`wordpress`] - REST collaborator (connectivity checks, nonce, posts)

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod config;
pub mod http_client;
mod user_agent;
pub mod wordpress;

// Re-export commonly used types
pub use auth::{
    AcquireState, AcquiredSession, AuthError, AuthMethod, BasicAuthProbe, CookieFile, CookieJar,
    CookieValidator, CredentialLogin, LoginFormSnapshot, LoginOutcome, ManualCookieCapture,
    NonInteractivePrompt, Prompt, Session, SessionAcquirer, SessionKind, StepEvent, StorageError,
    TerminalPrompt, TierFailure, transition,
};
pub use config::{ConfigError, Credentials, HttpTimeouts, SiteConfig, normalize_base_url};
pub use http_client::{build_check_client, build_http_client};
pub use wordpress::{
    CheckStep, CreatedPost, NewPost, PostStatus, PostSummary, SiteReport, UserProfile,
    WordPressClient, WordPressError, check_site,
};
