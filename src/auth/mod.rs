//! Session acquisition and the authentication fallback chain.
//!
//! A run tries, in order: cookies persisted by an earlier run, a scripted
//! form login, operator-pasted browser cookies (only after a security
//! challenge), and finally HTTP Basic with an application password.
//!
//! # Example
//!
//! ```no_run
//! use wp_autopost_core::{
//!     CookieFile, HttpTimeouts, SessionAcquirer, SiteConfig, TerminalPrompt, build_http_client,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SiteConfig::from_env()?;
//! let timeouts = HttpTimeouts::default();
//! let client = build_http_client(&timeouts)?;
//! let mut acquirer = SessionAcquirer::new(
//!     config,
//!     CookieFile::at_default_location()?,
//!     client,
//!     timeouts,
//!     TerminalPrompt::stdio(),
//! );
//! let session = acquirer.acquire_session().await?;
//! println!("authenticated with a {} session", session.kind());
//! # Ok(())
//! # }
//! ```

mod acquirer;
mod basic;
mod capture;
mod error;
mod form;
mod jar;
mod login;
mod session;
mod storage;
mod validator;

pub use acquirer::{AcquireState, SessionAcquirer, StepEvent, transition};
pub use basic::{BasicAuthProbe, USERS_ME_PATH, authorization_header_value, basic_token};
pub use capture::{
    DONE_TOKEN, ManualCookieCapture, NonInteractivePrompt, Prompt, TerminalPrompt, is_cookie_pair,
    is_done_token,
};
pub use error::{AuthError, AuthMethod, TierFailure};
pub use form::{LoginFormSnapshot, PASSWORD_FIELD, USERNAME_FIELD};
pub use jar::{CookieJar, set_cookie_pair};
pub use login::{
    ADMIN_PATH_MARKER, CredentialLogin, LoginOutcome, LoginResponse, SECURITY_CHALLENGE_MARKERS,
    extract_login_error, find_challenge_marker, interpret_login_response,
};
pub use session::{AcquiredSession, Session, SessionKind};
pub use storage::{COOKIE_FILE_NAME, CookieFile, StorageError, default_cookie_path};
pub use validator::{AUTHENTICATED_MARKER, CookieValidator, is_authenticated_page};
