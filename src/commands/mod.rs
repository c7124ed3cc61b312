//! CLI command handlers.

mod check;
mod post;
mod session;

pub use check::run_check_command;
pub use post::run_post_command;
pub use session::{run_capture_command, run_clear_command, run_login_command};

use tracing::{error, info};
use wp_autopost_core::AuthError;

/// Logs an authentication failure with the per-tier summary and next steps.
pub(crate) fn report_auth_failure(error: &AuthError) {
    error!("{error}");
    match error {
        AuthError::ConfigMissing { .. } => {
            info!("Set WP_USERNAME and WP_APP_PASSWORD to enable login and Basic Auth");
        }
        AuthError::Fatal { attempts } => {
            if let Some(last) = attempts.last() {
                error!(method = %last.method, "Last attempted method failed: {}", last.error);
            }
            info!("If a security plugin blocks scripted login, run `wp-autopost capture` to paste browser cookies");
        }
        _ => {}
    }
}
