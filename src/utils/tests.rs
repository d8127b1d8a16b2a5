use super::{FileUtils, UrlUtils};
use crate::error::CookieMasterError;
use std::path::PathBuf;
use url::Url;

#[test]
fn validate_url_adds_scheme() {
    let url = UrlUtils::validate_url("example.com").expect("valid url");
    assert_eq!(url.scheme(), "http");
    assert_eq!(url.host_str(), Some("example.com"));
}

#[test]
fn validate_url_keeps_non_network_schemes() {
    let url = UrlUtils::validate_url("about:blank").expect("about url");
    assert_eq!(url.as_str(), "about:blank");
    let url = UrlUtils::validate_url("data:text/html,hi").expect("data url");
    assert_eq!(url.scheme(), "data");
    assert!(!UrlUtils::is_http_url(url.as_str()));
}

#[test]
fn validate_url_treats_host_port_as_http() {
    let url = UrlUtils::validate_url("example.com:8080").expect("host and port");
    assert_eq!(url.scheme(), "http");
    assert_eq!(url.host_str(), Some("example.com"));
    assert_eq!(url.port(), Some(8080));
    let url = UrlUtils::validate_url("localhost:3000/app").expect("localhost");
    assert_eq!(url.as_str(), "http://localhost:3000/app");
}

#[test]
fn validate_url_rejects_invalid_input() {
    let err = UrlUtils::validate_url("http://").expect_err("invalid url");
    assert!(matches!(err, CookieMasterError::InvalidUrl(_)));
}

#[test]
fn is_http_url_rejects_internal_pages() {
    assert!(UrlUtils::is_http_url("https://example.com/"));
    assert!(UrlUtils::is_http_url("http://example.com/"));
    assert!(!UrlUtils::is_http_url("chrome://extensions"));
    assert_eq!(UrlUtils::scheme_of("chrome://extensions"), "chrome");
}

#[test]
fn cookie_url_strips_only_one_leading_dot() {
    assert_eq!(
        UrlUtils::cookie_url(true, ".example.com", "/"),
        "https://example.com/"
    );
    assert_eq!(
        UrlUtils::cookie_url(false, "example.com", "/docs"),
        "http://example.com/docs"
    );
}

#[test]
fn creation_url_uses_page_protocol() {
    assert_eq!(
        UrlUtils::creation_url("https:", ".example.com").expect("url"),
        "https://example.com/"
    );
    let err = UrlUtils::creation_url("https:", "bad domain").expect_err("invalid");
    assert!(matches!(err, CookieMasterError::InvalidUrl(_)));
}

#[test]
fn domain_matches_requires_label_boundary() {
    assert!(UrlUtils::domain_matches("example.com", "example.com"));
    assert!(UrlUtils::domain_matches("www.example.com", "example.com"));
    assert!(!UrlUtils::domain_matches("badexample.com", "example.com"));
    assert!(!UrlUtils::domain_matches("example.com", "www.example.com"));
    assert!(!UrlUtils::domain_matches("example.com", ""));
}

#[test]
fn path_matches_follows_rfc_6265() {
    assert!(UrlUtils::path_matches("/", "/"));
    assert!(UrlUtils::path_matches("/docs/a", "/docs"));
    assert!(UrlUtils::path_matches("/docs/a", "/docs/"));
    assert!(!UrlUtils::path_matches("/docsx", "/docs"));
    assert!(!UrlUtils::path_matches("/", "/docs"));
}

#[test]
fn default_path_drops_last_segment() {
    let url = Url::parse("https://example.com/a/b/c").expect("url");
    assert_eq!(UrlUtils::default_path(&url), "/a/b");
    let url = Url::parse("https://example.com/index.html").expect("url");
    assert_eq!(UrlUtils::default_path(&url), "/");
}

#[test]
fn expand_path_expands_home() {
    let home = dirs::home_dir().expect("home dir");
    let path = FileUtils::expand_path("~/cookie-master-test").expect("expanded");
    assert_eq!(path, home.join("cookie-master-test"));
}

#[test]
fn expand_path_leaves_non_tilde_unchanged() {
    let path = FileUtils::expand_path("/tmp/cookie-master").expect("expanded");
    assert_eq!(path, PathBuf::from("/tmp/cookie-master"));
}
