//! Cookie file behavior across separate acquisition runs.

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wp_autopost_core::{AuthMethod, CookieFile, CookieJar};

mod support;
use support::socket_guard::mock_site_or_skip;
use support::{LOGGED_IN_DASHBOARD, LOGIN_PAGE, non_interactive_acquirer, read_cookie_file, site_config};

async fn mount_login(server: &MockServer, expected_logins: u64) {
    Mock::given(method("GET"))
        .and(path("/wp-login.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/wp-login.php"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", "/wp-admin/")
                .insert_header("Set-Cookie", "wordpress_logged_in_abc=fresh; path=/; HttpOnly"),
        )
        .expect(expected_logins)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_corrupt_cookie_file_is_replaced_after_login() {
    let Some(server) = mock_site_or_skip().await else {
        return;
    };
    let dir = tempfile::TempDir::new().unwrap();
    let cookie_path = dir.path().join(".wp_cookies.json");
    std::fs::write(&cookie_path, "{not json").unwrap();

    mount_login(&server, 1).await;

    let mut acquirer = non_interactive_acquirer(site_config(&server.uri(), true), &cookie_path);
    let acquired = acquirer.acquire().await.unwrap();

    assert_eq!(acquired.method, AuthMethod::Login);
    assert_eq!(
        read_cookie_file(&cookie_path),
        vec!["wordpress_logged_in_abc=fresh"]
    );
}

#[tokio::test]
async fn test_second_run_reuses_cookies_saved_by_first() {
    let Some(server) = mock_site_or_skip().await else {
        return;
    };
    let dir = tempfile::TempDir::new().unwrap();
    let cookie_path = dir.path().join("nested").join(".wp_cookies.json");

    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/wp-admin/"))
        .and(header("cookie", "wordpress_logged_in_abc=fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LOGGED_IN_DASHBOARD))
        .expect(1)
        .mount(&server)
        .await;

    let config = site_config(&server.uri(), true);
    let first = non_interactive_acquirer(config.clone(), &cookie_path)
        .acquire()
        .await
        .unwrap();
    assert_eq!(first.method, AuthMethod::Login);

    let second = non_interactive_acquirer(config, &cookie_path)
        .acquire()
        .await
        .unwrap();
    assert_eq!(second.method, AuthMethod::SavedCookies);
    assert_eq!(
        second.session.cookie_jar().map(CookieJar::serialize),
        Some(vec!["wordpress_logged_in_abc=fresh".to_string()])
    );
}

#[test]
fn test_cleared_file_loads_as_empty() {
    let dir = tempfile::TempDir::new().unwrap();
    let file = CookieFile::new(dir.path().join(".wp_cookies.json"));
    file.save(&CookieJar::from_cookies(vec!["a=1".to_string()]))
        .unwrap();

    assert_eq!(file.load(), vec!["a=1"]);
    assert!(file.clear().unwrap());
    assert!(file.load().is_empty());
    assert!(!file.clear().unwrap());
}

#[test]
fn test_non_string_entries_are_treated_as_corrupt() {
    let dir = tempfile::TempDir::new().unwrap();
    let file = CookieFile::new(dir.path().join(".wp_cookies.json"));
    std::fs::write(file.path(), r#"["a=1", 2]"#).unwrap();

    assert!(file.try_load().is_err());
    assert!(file.load().is_empty());
}
