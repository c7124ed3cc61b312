//! Skips wiremock-backed tests where localhost sockets cannot be bound
//! (sandboxed CI), unless `WP_AUTOPOST_REQUIRE_SOCKET_TESTS` demands them.

use std::net::TcpListener;
use std::panic::Location;

use wiremock::MockServer;

pub const REQUIRE_SOCKET_TESTS_ENV: &str = "WP_AUTOPOST_REQUIRE_SOCKET_TESTS";

#[must_use]
pub fn socket_tests_required() -> bool {
    std::env::var(REQUIRE_SOCKET_TESTS_ENV)
        .is_ok_and(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

#[track_caller]
fn localhost_unavailable() -> bool {
    if TcpListener::bind("127.0.0.1:0").is_ok() {
        return false;
    }

    let caller = Location::caller();
    let message = format!(
        "[socket-bound-test] {}:{} cannot bind a localhost socket for the mock WordPress site",
        caller.file(),
        caller.line()
    );
    assert!(
        !socket_tests_required(),
        "{message}; unset {REQUIRE_SOCKET_TESTS_ENV} to allow skipping"
    );
    eprintln!("{message}; skipping. Set {REQUIRE_SOCKET_TESTS_ENV}=1 to fail instead.");
    true
}

/// Starts a mock WordPress site, or returns `None` when the test should skip.
#[track_caller]
pub fn mock_site_or_skip() -> impl Future<Output = Option<MockServer>> {
    let skip = localhost_unavailable();
    async move {
        if skip {
            None
        } else {
            Some(MockServer::start().await)
        }
    }
}
