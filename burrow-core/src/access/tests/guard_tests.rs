use crate::access::{AccessDecision, ROBOTS_BODY, check_access, is_hidden_name};
use crate::conf::{ServerConfig, ServerOptions};
use crate::ctx::normalize_path;
use base64::{Engine as _, engine::general_purpose};
use http::HeaderValue;
use tempfile::{TempDir, tempdir};

fn config(dir: &TempDir, tweak: impl FnOnce(&mut ServerOptions)) -> ServerConfig {
    let mut opts = ServerOptions {
        root: dir.path().to_path_buf(),
        ..ServerOptions::default()
    };
    tweak(&mut opts);
    ServerConfig::from_options_with_env(opts, |_| None).unwrap()
}

#[test]
fn plain_request_is_allowed() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |_| {});
    let path = normalize_path("/index.html").unwrap();

    assert_eq!(check_access(&cfg, &path, None), AccessDecision::Allow);
}

#[test]
fn dotfile_is_hidden_by_default() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |_| {});
    let path = normalize_path("/.secret").unwrap();

    assert_eq!(check_access(&cfg, &path, None), AccessDecision::Hidden);
}

#[test]
fn dot_directory_anywhere_in_path_is_hidden() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |_| {});
    let path = normalize_path("/a/.git/config").unwrap();

    assert_eq!(check_access(&cfg, &path, None), AccessDecision::Hidden);
}

#[test]
fn encoded_dotfile_is_hidden() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |_| {});
    let path = normalize_path("/%2esecret").unwrap();

    assert_eq!(check_access(&cfg, &path, None), AccessDecision::Hidden);
}

#[test]
fn dotfiles_are_allowed_when_shown() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |o| o.show_dotfiles = true);
    let path = normalize_path("/.secret").unwrap();

    assert_eq!(check_access(&cfg, &path, None), AccessDecision::Allow);
}

#[test]
fn robots_is_answered_when_enabled() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |o| o.robots = true);
    let path = normalize_path("/robots.txt").unwrap();

    assert_eq!(check_access(&cfg, &path, None), AccessDecision::Robots);
    assert_eq!(ROBOTS_BODY, "User-agent: *\nDisallow: /\n");
}

#[test]
fn nested_robots_is_not_special() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |o| o.robots = true);
    let path = normalize_path("/docs/robots.txt").unwrap();

    assert_eq!(check_access(&cfg, &path, None), AccessDecision::Allow);
}

#[test]
fn robots_is_a_file_when_disabled() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |_| {});
    let path = normalize_path("/robots.txt").unwrap();

    assert_eq!(check_access(&cfg, &path, None), AccessDecision::Allow);
}

#[test]
fn auth_runs_before_everything_else() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |o| {
        o.robots = true;
        o.username = Some("admin".to_string());
        o.password = Some("pw".to_string());
    });

    for raw in ["/robots.txt", "/.secret", "/index.html"] {
        let path = normalize_path(raw).unwrap();
        assert_eq!(
            check_access(&cfg, &path, None),
            AccessDecision::Unauthorized,
            "{raw}"
        );
    }
}

#[test]
fn valid_credentials_pass_the_guard() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir, |o| {
        o.username = Some("admin".to_string());
        o.password = Some("pw".to_string());
    });
    let token = general_purpose::STANDARD.encode("admin:pw");
    let header = HeaderValue::from_str(&format!("Basic {token}")).unwrap();
    let path = normalize_path("/index.html").unwrap();

    assert_eq!(
        check_access(&cfg, &path, Some(&header)),
        AccessDecision::Allow
    );
}

#[test]
fn hidden_names_start_with_a_dot() {
    assert!(is_hidden_name(".env"));
    assert!(!is_hidden_name("env"));
    assert!(!is_hidden_name("a.txt"));
}
