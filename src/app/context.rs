//! Shared runtime context built from global CLI options and the environment.

use anyhow::{Context, Result};
use reqwest::Client;
use wp_autopost_core::{
    CookieFile, HttpTimeouts, NonInteractivePrompt, Prompt, SessionAcquirer, SiteConfig,
    TerminalPrompt, build_check_client, build_http_client,
};

use crate::cli::GlobalArgs;

/// Holds what every networked command needs so handlers take one argument.
pub(crate) struct RunContext {
    pub(crate) config: SiteConfig,
    pub(crate) timeouts: HttpTimeouts,
    pub(crate) client: Client,
    pub(crate) check_client: Client,
    pub(crate) cookie_file: CookieFile,
    pub(crate) non_interactive: bool,
}

impl RunContext {
    pub(crate) fn from_args(args: &GlobalArgs) -> Result<Self> {
        let config = SiteConfig::from_env()?;
        let timeouts = HttpTimeouts::with_auth_timeout_secs(args.timeout);
        let client = build_http_client(&timeouts).context("Failed to build HTTP client")?;
        let check_client =
            build_check_client(&timeouts).context("Failed to build connectivity check client")?;
        let cookie_file = resolve_cookie_file(args)?;

        tracing::debug!(
            site = %config.base_url(),
            credentials = config.credentials().is_some(),
            cookie_file = %cookie_file.path().display(),
            "Runtime context ready"
        );

        Ok(Self {
            config,
            timeouts,
            client,
            check_client,
            cookie_file,
            non_interactive: args.non_interactive,
        })
    }

    /// Operator channel: stdin/stdout, or one that declines everything.
    pub(crate) fn prompt(&self) -> Box<dyn Prompt> {
        if self.non_interactive {
            Box::new(NonInteractivePrompt)
        } else {
            Box::new(TerminalPrompt::stdio())
        }
    }

    pub(crate) fn acquirer(&self) -> SessionAcquirer<Box<dyn Prompt>> {
        SessionAcquirer::new(
            self.config.clone(),
            self.cookie_file.clone(),
            self.client.clone(),
            self.timeouts,
            self.prompt(),
        )
        .interactive(!self.non_interactive)
    }
}

/// Cookie file from `--cookie-file`, or the default beside the executable.
pub(crate) fn resolve_cookie_file(args: &GlobalArgs) -> Result<CookieFile> {
    match &args.cookie_file {
        Some(path) => Ok(CookieFile::new(path)),
        None => Ok(CookieFile::at_default_location()?),
    }
}
