//! Session acquisition state machine.
//!
//! The fallback chain is an explicit [`AcquireState`] enum advanced by the
//! pure [`transition`] function. [`SessionAcquirer`] only performs the I/O
//! each state asks for, turns the result into a [`StepEvent`], records
//! failures in the attempt ledger, and persists cookie sessions produced by
//! login or capture.
//!
//! ```text
//! LoadCookies -> ValidateCookies -> Done(Cookie)
//!      |               |
//!      +---(empty)-----+--(invalid)--> Login -> Done(Cookie)
//!                                        | challenge      | failure
//!                                        v                v
//!                                  ManualCapture ---> BasicFallback -> Done(Basic)
//!                                        |                           |
//!                                        +-> Done(Cookie)            +-> Fatal
//! ```

use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use super::session::AcquiredSession;
use super::{
    AuthError, AuthMethod, BasicAuthProbe, CookieFile, CookieJar, CookieValidator,
    CredentialLogin, LoginOutcome, ManualCookieCapture, Prompt, Session, TierFailure,
};
use crate::config::{Credentials, HttpTimeouts, SiteConfig};

const MISSING_CREDENTIALS: &str = "WP_USERNAME and WP_APP_PASSWORD";

/// States of the acquisition flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireState {
    /// Read the persisted cookie file.
    LoadCookies,
    /// Check the loaded cookies against the admin dashboard.
    ValidateCookies(CookieJar),
    /// Scripted form login.
    Login,
    /// Operator-pasted cookies after a security challenge.
    ManualCapture,
    /// HTTP Basic probe.
    BasicFallback,
    /// A usable session was obtained.
    Done(Session),
    /// Every tier failed.
    Fatal,
}

impl AcquireState {
    /// Returns the tier this state attempts, if any.
    #[must_use]
    pub fn method(&self) -> Option<AuthMethod> {
        match self {
            Self::ValidateCookies(_) => Some(AuthMethod::SavedCookies),
            Self::Login => Some(AuthMethod::Login),
            Self::ManualCapture => Some(AuthMethod::ManualCapture),
            Self::BasicFallback => Some(AuthMethod::BasicAuth),
            Self::LoadCookies | Self::Done(_) | Self::Fatal => None,
        }
    }

    /// Returns true for `Done` and `Fatal`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Fatal)
    }

    fn label(&self) -> &'static str {
        match self {
            Self::LoadCookies => "load_cookies",
            Self::ValidateCookies(_) => "validate_cookies",
            Self::Login => "login",
            Self::ManualCapture => "manual_capture",
            Self::BasicFallback => "basic_fallback",
            Self::Done(_) => "done",
            Self::Fatal => "fatal",
        }
    }
}

/// Result of the I/O performed in one state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEvent {
    /// Cookies read from disk (possibly none).
    CookiesLoaded(CookieJar),
    /// Validation result; `Ok` carries the validated jar.
    CookiesChecked(Result<CookieJar, AuthError>),
    /// Credential login outcome.
    LoginFinished(LoginOutcome),
    /// Manual capture result.
    CaptureFinished(Result<CookieJar, AuthError>),
    /// Basic probe result; `Ok` carries the accepted credentials.
    BasicFinished(Result<Credentials, AuthError>),
}

impl StepEvent {
    /// Returns the ledger entry for an event that moves to a fallback tier.
    #[must_use]
    pub fn failure(&self) -> Option<TierFailure> {
        let (method, error) = match self {
            Self::CookiesLoaded(jar) if jar.is_empty() => (
                AuthMethod::SavedCookies,
                AuthError::session_invalid("no saved cookies"),
            ),
            Self::CookiesChecked(Ok(jar)) if jar.is_empty() => (
                AuthMethod::SavedCookies,
                AuthError::session_invalid("no saved cookies"),
            ),
            Self::CookiesChecked(Err(error)) => (AuthMethod::SavedCookies, error.clone()),
            Self::LoginFinished(LoginOutcome::Success(jar)) if jar.is_empty() => (
                AuthMethod::Login,
                AuthError::rejected(None, "login produced no session cookies"),
            ),
            Self::LoginFinished(LoginOutcome::SecurityChallenge { marker }) => {
                (AuthMethod::Login, AuthError::security_challenge(marker))
            }
            Self::LoginFinished(LoginOutcome::Failure(error)) => (AuthMethod::Login, error.clone()),
            Self::CaptureFinished(Ok(jar)) if jar.is_empty() => (
                AuthMethod::ManualCapture,
                AuthError::capture_failed("no cookies were entered"),
            ),
            Self::CaptureFinished(Err(error)) => (AuthMethod::ManualCapture, error.clone()),
            Self::BasicFinished(Err(error)) => (AuthMethod::BasicAuth, error.clone()),
            _ => return None,
        };
        Some(TierFailure::new(method, error))
    }
}

/// Advances the acquisition flow.
///
/// Cookie sessions are only produced from non-empty jars. An event that does
/// not belong to the current state leads to `Fatal`.
#[must_use]
pub fn transition(state: AcquireState, event: StepEvent) -> AcquireState {
    use AcquireState as S;
    use StepEvent as E;

    match (state, event) {
        (S::LoadCookies, E::CookiesLoaded(jar)) => {
            if jar.is_empty() {
                S::Login
            } else {
                S::ValidateCookies(jar)
            }
        }

        (S::ValidateCookies(_), E::CookiesChecked(Ok(jar))) if !jar.is_empty() => {
            S::Done(Session::Cookie(jar))
        }
        (S::ValidateCookies(_), E::CookiesChecked(_)) => S::Login,

        (S::Login, E::LoginFinished(LoginOutcome::Success(jar))) if !jar.is_empty() => {
            S::Done(Session::Cookie(jar))
        }
        (S::Login, E::LoginFinished(LoginOutcome::SecurityChallenge { .. })) => S::ManualCapture,
        (S::Login, E::LoginFinished(_)) => S::BasicFallback,

        (S::ManualCapture, E::CaptureFinished(Ok(jar))) if !jar.is_empty() => {
            S::Done(Session::Cookie(jar))
        }
        (S::ManualCapture, E::CaptureFinished(_)) => S::BasicFallback,

        (S::BasicFallback, E::BasicFinished(Ok(credentials))) => S::Done(Session::Basic(credentials)),
        (S::BasicFallback, E::BasicFinished(Err(_))) => S::Fatal,

        (state, event) => {
            warn!(state = state.label(), event = ?event, "Unexpected event for acquisition state");
            S::Fatal
        }
    }
}

/// Runs the fallback chain for one site and persists the resulting cookies.
pub struct SessionAcquirer<P: Prompt> {
    config: SiteConfig,
    cookie_file: CookieFile,
    client: Client,
    timeouts: HttpTimeouts,
    prompt: P,
    interactive: bool,
}

impl<P: Prompt> SessionAcquirer<P> {
    /// Creates an acquirer.
    ///
    /// `client` must not follow redirects (see [`crate::build_http_client`]).
    pub fn new(
        config: SiteConfig,
        cookie_file: CookieFile,
        client: Client,
        timeouts: HttpTimeouts,
        prompt: P,
    ) -> Self {
        Self {
            config,
            cookie_file,
            client,
            timeouts,
            prompt,
            interactive: true,
        }
    }

    /// Enables or disables the manual capture tier.
    #[must_use]
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Consumes the acquirer, returning its prompt.
    pub fn into_prompt(self) -> P {
        self.prompt
    }

    /// Returns a usable session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Fatal`] with the per-tier ledger when every tier fails.
    pub async fn acquire_session(&mut self) -> Result<Session, AuthError> {
        self.acquire().await.map(|acquired| acquired.session)
    }

    /// Returns a usable session and the tier that produced it.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Fatal`] with the per-tier ledger when every tier fails.
    #[instrument(skip(self), fields(site = %self.config.base_url(), cookie_file = %self.cookie_file.path().display()))]
    pub async fn acquire(&mut self) -> Result<AcquiredSession, AuthError> {
        let mut state = AcquireState::LoadCookies;
        let mut attempts: Vec<TierFailure> = Vec::new();
        let mut resolved_by = None;

        while !state.is_terminal() {
            let event = match &state {
                AcquireState::LoadCookies => {
                    StepEvent::CookiesLoaded(CookieJar::from_cookies(self.cookie_file.load()))
                }
                AcquireState::ValidateCookies(jar) => {
                    StepEvent::CookiesChecked(self.validate(jar).await)
                }
                AcquireState::Login => StepEvent::LoginFinished(self.login().await),
                AcquireState::ManualCapture => StepEvent::CaptureFinished(self.capture()),
                AcquireState::BasicFallback => StepEvent::BasicFinished(self.basic().await),
                AcquireState::Done(_) | AcquireState::Fatal => break,
            };

            if let Some(failure) = event.failure() {
                warn!(method = %failure.method, error = %failure.error, "Authentication tier failed");
                attempts.push(failure);
            }

            let method = state.method();
            let from = state.label();
            let next = transition(state, event);
            debug!(from, to = next.label(), "Acquisition transition");

            if let AcquireState::Done(session) = &next {
                resolved_by = method;
                if matches!(method, Some(AuthMethod::Login | AuthMethod::ManualCapture)) {
                    self.persist(session);
                }
            }
            state = next;
        }

        match (state, resolved_by) {
            (AcquireState::Done(session), Some(method)) => {
                info!(method = %method, session = %session.kind(), "Session acquired");
                Ok(AcquiredSession { session, method })
            }
            _ => Err(AuthError::Fatal { attempts }),
        }
    }

    fn credentials(&self) -> Result<Credentials, AuthError> {
        self.config
            .credentials()
            .cloned()
            .ok_or_else(|| AuthError::config_missing(MISSING_CREDENTIALS))
    }

    async fn validate(&self, jar: &CookieJar) -> Result<CookieJar, AuthError> {
        CookieValidator::new(self.client.clone(), &self.config)
            .validate(jar)
            .await
            .map(|()| jar.clone())
    }

    async fn login(&self) -> LoginOutcome {
        match self.credentials() {
            Ok(credentials) => {
                CredentialLogin::new(self.client.clone(), &self.config)
                    .login(&credentials)
                    .await
            }
            Err(error) => LoginOutcome::Failure(error),
        }
    }

    fn capture(&mut self) -> Result<CookieJar, AuthError> {
        if !self.interactive {
            return Err(AuthError::capture_failed("declined (non-interactive mode)"));
        }
        let capture = ManualCookieCapture::new(self.config.login_url());
        if !capture.confirm(&mut self.prompt) {
            return Err(AuthError::capture_failed("declined by operator"));
        }
        capture.run(&mut self.prompt)
    }

    async fn basic(&self) -> Result<Credentials, AuthError> {
        let credentials = self.credentials()?;
        BasicAuthProbe::new(self.client.clone(), &self.config, self.timeouts.check_request)
            .probe(&credentials)
            .await?;
        Ok(credentials)
    }

    fn persist(&self, session: &Session) {
        let Some(jar) = session.cookie_jar() else {
            return;
        };
        if let Err(error) = self.cookie_file.save(jar) {
            warn!(error = %error, "Failed to persist session cookies; continuing with in-memory session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jar(cookies: &[&str]) -> CookieJar {
        CookieJar::from_cookies(cookies.iter().map(|c| (*c).to_string()).collect())
    }

    fn credentials() -> Credentials {
        Credentials::new("admin", "secret")
    }

    #[test]
    fn test_empty_load_skips_validation() {
        let next = transition(AcquireState::LoadCookies, StepEvent::CookiesLoaded(jar(&[])));
        assert_eq!(next, AcquireState::Login);
    }

    #[test]
    fn test_loaded_cookies_are_validated() {
        let next = transition(
            AcquireState::LoadCookies,
            StepEvent::CookiesLoaded(jar(&["a=1"])),
        );
        assert_eq!(next, AcquireState::ValidateCookies(jar(&["a=1"])));
    }

    #[test]
    fn test_valid_cookies_finish_with_cookie_session() {
        let next = transition(
            AcquireState::ValidateCookies(jar(&["a=1"])),
            StepEvent::CookiesChecked(Ok(jar(&["a=1"]))),
        );
        assert_eq!(next, AcquireState::Done(Session::Cookie(jar(&["a=1"]))));
    }

    #[test]
    fn test_invalid_cookies_fall_through_to_login() {
        let next = transition(
            AcquireState::ValidateCookies(jar(&["a=1"])),
            StepEvent::CookiesChecked(Err(AuthError::session_invalid("HTTP 302 redirect"))),
        );
        assert_eq!(next, AcquireState::Login);
    }

    #[test]
    fn test_login_outcomes() {
        assert_eq!(
            transition(
                AcquireState::Login,
                StepEvent::LoginFinished(LoginOutcome::Success(jar(&["s=1"])))
            ),
            AcquireState::Done(Session::Cookie(jar(&["s=1"])))
        );
        assert_eq!(
            transition(
                AcquireState::Login,
                StepEvent::LoginFinished(LoginOutcome::SecurityChallenge {
                    marker: "verification is required".to_string()
                })
            ),
            AcquireState::ManualCapture
        );
        assert_eq!(
            transition(
                AcquireState::Login,
                StepEvent::LoginFinished(LoginOutcome::Failure(AuthError::rejected(
                    Some(200),
                    "bad password"
                )))
            ),
            AcquireState::BasicFallback
        );
    }

    #[test]
    fn test_login_success_with_empty_jar_falls_back() {
        let event = StepEvent::LoginFinished(LoginOutcome::Success(jar(&[])));
        assert!(event.failure().is_some());
        assert_eq!(transition(AcquireState::Login, event), AcquireState::BasicFallback);
    }

    #[test]
    fn test_capture_outcomes() {
        assert_eq!(
            transition(
                AcquireState::ManualCapture,
                StepEvent::CaptureFinished(Ok(jar(&["m=1"])))
            ),
            AcquireState::Done(Session::Cookie(jar(&["m=1"])))
        );
        assert_eq!(
            transition(
                AcquireState::ManualCapture,
                StepEvent::CaptureFinished(Err(AuthError::capture_failed("declined")))
            ),
            AcquireState::BasicFallback
        );
    }

    #[test]
    fn test_basic_outcomes() {
        assert_eq!(
            transition(
                AcquireState::BasicFallback,
                StepEvent::BasicFinished(Ok(credentials()))
            ),
            AcquireState::Done(Session::Basic(credentials()))
        );
        assert_eq!(
            transition(
                AcquireState::BasicFallback,
                StepEvent::BasicFinished(Err(AuthError::rejected(Some(401), "invalid")))
            ),
            AcquireState::Fatal
        );
    }

    #[test]
    fn test_mismatched_event_is_fatal() {
        assert_eq!(
            transition(
                AcquireState::LoadCookies,
                StepEvent::BasicFinished(Ok(credentials()))
            ),
            AcquireState::Fatal
        );
        assert_eq!(
            transition(
                AcquireState::Done(Session::Basic(credentials())),
                StepEvent::CookiesLoaded(jar(&["a=1"]))
            ),
            AcquireState::Fatal
        );
    }

    #[test]
    fn test_failure_ledger_entries() {
        let challenge = StepEvent::LoginFinished(LoginOutcome::SecurityChallenge {
            marker: "wfls-captcha-verify".to_string(),
        });
        assert_eq!(
            challenge.failure(),
            Some(TierFailure::new(
                AuthMethod::Login,
                AuthError::security_challenge("wfls-captcha-verify")
            ))
        );
        assert_eq!(
            StepEvent::CookiesLoaded(jar(&[])).failure().map(|f| f.method),
            Some(AuthMethod::SavedCookies)
        );
        assert!(StepEvent::CookiesLoaded(jar(&["a=1"])).failure().is_none());
        assert!(StepEvent::BasicFinished(Ok(credentials())).failure().is_none());
    }

    #[test]
    fn test_state_methods() {
        assert_eq!(AcquireState::LoadCookies.method(), None);
        assert_eq!(
            AcquireState::BasicFallback.method(),
            Some(AuthMethod::BasicAuth)
        );
        assert!(AcquireState::Fatal.is_terminal());
        assert!(!AcquireState::Login.is_terminal());
    }
}
