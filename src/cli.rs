//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use wp_autopost_core::PostStatus;
use wp_autopost_core::config::DEFAULT_AUTH_TIMEOUT_SECS;

/// Authenticate against a WordPress site and publish posts over its REST API.
///
/// Sessions are acquired in order from saved cookies, a scripted login,
/// browser cookies pasted by the operator, and finally HTTP Basic with an
/// application password. Configure the site with WP_URL, WP_USERNAME, and
/// WP_APP_PASSWORD.
#[derive(Parser, Debug)]
#[command(name = "wp-autopost")]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Cookie file path (default: .wp_cookies.json beside the executable)
    #[arg(long, value_name = "PATH", global = true)]
    pub cookie_file: Option<PathBuf>,

    /// Timeout in seconds for login and cookie validation requests (1-300)
    #[arg(long, default_value_t = DEFAULT_AUTH_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=300), global = true)]
    pub timeout: u64,

    /// Never prompt; manual cookie capture is declined automatically
    #[arg(long, global = true)]
    pub non_interactive: bool,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Acquire a session and report which method succeeded
    Login,

    /// Paste browser cookies manually and save them
    Capture,

    /// Check site connectivity, then authenticate and report permissions
    Check,

    /// Acquire a session and create a post
    Post(PostArgs),

    /// Delete the saved cookie file
    Clear,
}

/// Arguments of the `post` command.
#[derive(Args, Debug, Clone)]
pub struct PostArgs {
    /// Post title
    #[arg(long)]
    pub title: String,

    /// Post content (HTML allowed)
    #[arg(long)]
    pub content: String,

    /// Post status: draft, publish, pending, or private
    #[arg(long, default_value_t = PostStatus::Draft)]
    pub status: PostStatus,
}
