//! Operator-driven cookie capture for sites whose security layer defeats
//! scripted login (mandatory email verification, CAPTCHA).
//!
//! The operator logs in with a real browser and pastes each cookie as a
//! `name=value` line; the literal `done` ends the loop.

use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

use tracing::{debug, info, instrument, warn};

use super::{AuthError, CookieJar};

/// Line that ends the capture loop (case-insensitive).
pub const DONE_TOKEN: &str = "done";

const CONFIRM_QUESTION: &str =
    "Would you like to manually input cookies from your browser? (yes/no): ";
const COOKIE_QUESTION: &str = "Enter cookie (name=value) or 'done' to finish: ";
const INVALID_COOKIE_MESSAGE: &str = "Invalid cookie format. Please use 'name=value' format.";

/// Line-oriented operator channel.
///
/// `ask` returns `Ok(None)` at end of input.
pub trait Prompt {
    /// Shows `question` and reads one trimmed answer line.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the channel cannot be used.
    fn ask(&mut self, question: &str) -> io::Result<Option<String>>;

    /// Shows an informational line.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the channel cannot be used.
    fn say(&mut self, message: &str) -> io::Result<()>;
}

impl<P: Prompt + ?Sized> Prompt for Box<P> {
    fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        (**self).ask(question)
    }

    fn say(&mut self, message: &str) -> io::Result<()> {
        (**self).say(message)
    }
}

/// Prompt over a reader/writer pair, stdin/stdout in production.
#[derive(Debug)]
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    /// Creates a prompt over arbitrary streams.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consumes the prompt, returning the output stream.
    pub fn into_output(self) -> W {
        self.output
    }
}

impl TerminalPrompt<BufReader<Stdin>, Stdout> {
    /// Creates a prompt over the process's stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt for TerminalPrompt<R, W> {
    fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut raw = Vec::new();
        if self.input.read_until(b'\n', &mut raw)? == 0 {
            return Ok(None);
        }
        let line = String::from_utf8(raw)
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;
        Ok(Some(line.trim().to_string()))
    }

    fn say(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{message}")
    }
}

/// Prompt that declines every question; used with `--non-interactive`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonInteractivePrompt;

impl Prompt for NonInteractivePrompt {
    fn ask(&mut self, _question: &str) -> io::Result<Option<String>> {
        Ok(None)
    }

    fn say(&mut self, _message: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Returns true for the loop terminator, ignoring case and surrounding whitespace.
#[must_use]
pub fn is_done_token(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(DONE_TOKEN)
}

/// Returns true when `line` has the `name=value` shape.
#[must_use]
pub fn is_cookie_pair(line: &str) -> bool {
    line.split_once('=')
        .is_some_and(|(name, _)| !name.trim().is_empty())
}

/// Interactive cookie capture for one site.
#[derive(Debug, Clone)]
pub struct ManualCookieCapture {
    login_url: String,
}

impl ManualCookieCapture {
    /// Creates a capture flow pointing the operator at `login_url`.
    #[must_use]
    pub fn new(login_url: impl Into<String>) -> Self {
        Self {
            login_url: login_url.into(),
        }
    }

    /// Asks whether the operator wants to paste cookies.
    ///
    /// Only `yes` or `y` accepts; any other answer, end of input, or an I/O
    /// failure declines.
    pub fn confirm<P: Prompt + ?Sized>(&self, prompt: &mut P) -> bool {
        match prompt.ask(CONFIRM_QUESTION) {
            Ok(Some(answer)) => {
                matches!(answer.to_ascii_lowercase().as_str(), "yes" | "y")
            }
            Ok(None) => false,
            Err(error) => {
                debug!(error = %error, "Confirmation prompt unavailable");
                false
            }
        }
    }

    /// Runs the capture loop and returns a fresh jar of the entered cookies.
    ///
    /// Lines without `=` or with invalid UTF-8 are rejected and re-prompted.
    /// The loop ends on `done` or end of input.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ManualCaptureFailed`] when no cookie was entered
    /// or the prompt channel fails.
    #[instrument(skip(self, prompt), fields(login_url = %self.login_url))]
    pub fn run<P: Prompt + ?Sized>(&self, prompt: &mut P) -> Result<CookieJar, AuthError> {
        let io_failure =
            |error: io::Error| AuthError::capture_failed(format!("prompt I/O failed: {error}"));

        for line in self.instructions() {
            prompt.say(&line).map_err(io_failure)?;
        }

        let mut jar = CookieJar::new();
        loop {
            let line = match prompt.ask(COOKIE_QUESTION) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(error) if error.kind() == io::ErrorKind::InvalidData => {
                    warn!(error = %error, "Ignoring unreadable cookie line");
                    prompt.say(INVALID_COOKIE_MESSAGE).map_err(io_failure)?;
                    continue;
                }
                Err(error) => return Err(io_failure(error)),
            };
            if is_done_token(&line) {
                break;
            }
            if is_cookie_pair(&line) {
                jar.add(line);
                prompt.say("Cookie added.").map_err(io_failure)?;
            } else {
                prompt.say(INVALID_COOKIE_MESSAGE).map_err(io_failure)?;
            }
        }

        if jar.is_empty() {
            prompt.say("No cookies were added.").map_err(io_failure)?;
            return Err(AuthError::capture_failed("no cookies were entered"));
        }

        info!(count = jar.len(), names = ?jar.names().collect::<Vec<_>>(), "Cookies captured");
        Ok(jar)
    }

    fn instructions(&self) -> Vec<String> {
        vec![
            String::new(),
            "=== Manual Cookie Input ===".to_string(),
            "Please follow these steps to log in and get cookies:".to_string(),
            format!("1. Open your browser and go to: {}", self.login_url),
            "2. Log in with your WordPress credentials".to_string(),
            "3. Complete any verification step (email link, CAPTCHA)".to_string(),
            "4. After successful login, open your browser's developer tools:".to_string(),
            "   - Chrome: Right-click > Inspect > Application tab > Cookies".to_string(),
            "   - Firefox: Right-click > Inspect > Storage tab > Cookies".to_string(),
            "5. Find cookies for your WordPress domain".to_string(),
            "6. Copy each cookie in the format 'name=value'".to_string(),
            String::new(),
            "Enter cookies one by one. Type 'done' when finished.".to_string(),
            String::new(),
        ]
    }
}
