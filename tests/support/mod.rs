#![allow(dead_code)]

pub mod socket_guard;

use std::path::Path;

use wp_autopost_core::{
    CookieFile, Credentials, HttpTimeouts, NonInteractivePrompt, Prompt, SessionAcquirer,
    SiteConfig, build_http_client,
};

pub const LOGGED_IN_DASHBOARD: &str = r#"<html><body><ul id="wp-admin-bar-root-default"><li id="wp-admin-bar-edit-profile"><a href="/wp-admin/profile.php">Edit Profile</a></li></ul></body></html>"#;

pub const LOGIN_PAGE: &str = r#"<html><body>
<form name="loginform" id="loginform" action="/wp-login.php" method="post">
  <input type="text" name="log" id="user_login" value="" />
  <input type="password" name="pwd" id="user_pass" value="" />
  <input name="rememberme" type="checkbox" id="rememberme" value="forever" />
  <input type="submit" name="wp-submit" id="wp-submit" value="Log In" />
  <input type="hidden" name="redirect_to" value="/wp-admin/" />
  <input type="hidden" name="testcookie" value="1" />
</form>
</body></html>"#;

/// `base64("admin:secret")`, the Basic token for [`site_config`] credentials.
pub const ADMIN_BASIC_HEADER: &str = "Basic YWRtaW46c2VjcmV0";

pub fn site_config(base_url: &str, with_credentials: bool) -> SiteConfig {
    let credentials = with_credentials.then(|| Credentials::new("admin", "secret"));
    SiteConfig::new(base_url, credentials).expect("mock server URL is valid")
}

pub fn acquirer_with_prompt<P: Prompt>(
    config: SiteConfig,
    cookie_path: &Path,
    prompt: P,
) -> SessionAcquirer<P> {
    let timeouts = HttpTimeouts::with_auth_timeout_secs(5);
    let client = build_http_client(&timeouts).expect("client builds");
    SessionAcquirer::new(config, CookieFile::new(cookie_path), client, timeouts, prompt)
}

pub fn non_interactive_acquirer(
    config: SiteConfig,
    cookie_path: &Path,
) -> SessionAcquirer<NonInteractivePrompt> {
    acquirer_with_prompt(config, cookie_path, NonInteractivePrompt).interactive(false)
}

pub fn write_cookie_file(path: &Path, cookies: &[&str]) {
    std::fs::write(path, serde_json::to_string(cookies).expect("serializable"))
        .expect("cookie file written");
}

pub fn read_cookie_file(path: &Path) -> Vec<String> {
    serde_json::from_str(&std::fs::read_to_string(path).expect("cookie file exists"))
        .expect("cookie file is a JSON array")
}
