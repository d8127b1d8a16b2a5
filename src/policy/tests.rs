use std::sync::Arc;

use super::{PolicySettings, PolicyStore, Verdict};
use crate::cookie::{ChangeCause, Cookie, CookieChange, DEFAULT_STORE_ID};
use crate::error::CookieMasterError;
use crate::host::SqliteStorage;

fn cookie(name: &str, value: &str) -> Cookie {
    Cookie {
        name: name.to_string(),
        value: value.to_string(),
        domain: ".example.com".to_string(),
        host_only: false,
        path: "/".to_string(),
        secure: false,
        http_only: false,
        store_id: DEFAULT_STORE_ID.to_string(),
        expiration_date: None,
    }
}

fn settings(locked: &[(&str, &str)], blacklisted: &[&str]) -> PolicySettings {
    PolicySettings {
        locked_cookies: locked
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect(),
        blacklisted_cookies: blacklisted.iter().map(|n| n.to_string()).collect(),
    }
}

fn store() -> PolicyStore {
    PolicyStore::new(Arc::new(SqliteStorage::open_in_memory().expect("storage")))
}

#[test]
fn blacklist_removes_added_cookies_and_ignores_removals() {
    let rules = settings(&[], &["tracker"]);
    assert_eq!(
        rules.verdict(&CookieChange::added(cookie("tracker", "x"))),
        Verdict::Remove
    );
    assert_eq!(
        rules.verdict(&CookieChange::removed(
            cookie("tracker", "x"),
            ChangeCause::Explicit
        )),
        Verdict::Allow
    );
}

#[test]
fn blacklist_wins_over_lock() {
    let rules = settings(&[("sid", "v1")], &["sid"]);
    assert_eq!(
        rules.verdict(&CookieChange::added(cookie("sid", "v2"))),
        Verdict::Remove
    );
    assert_eq!(
        rules.verdict(&CookieChange::removed(
            cookie("sid", "v1"),
            ChangeCause::Explicit
        )),
        Verdict::Allow
    );
}

#[test]
fn lock_restores_changed_or_removed_cookie() {
    let rules = settings(&[("sid", "v1")], &[]);
    assert_eq!(
        rules.verdict(&CookieChange::added(cookie("sid", "v2"))),
        Verdict::Restore("v1".to_string())
    );
    assert_eq!(
        rules.verdict(&CookieChange::removed(
            cookie("sid", "v1"),
            ChangeCause::Explicit
        )),
        Verdict::Restore("v1".to_string())
    );
    assert_eq!(
        rules.verdict(&CookieChange::added(cookie("sid", "v1"))),
        Verdict::Allow
    );
}

#[test]
fn lock_ignores_overwrite_removals() {
    let rules = settings(&[("sid", "v1")], &[]);
    assert_eq!(
        rules.verdict(&CookieChange::removed(
            cookie("sid", "v1"),
            ChangeCause::Overwrite
        )),
        Verdict::Allow
    );
    assert_eq!(
        rules.verdict(&CookieChange::removed(
            cookie("sid", "v1"),
            ChangeCause::ExpiredOverwrite
        )),
        Verdict::Restore("v1".to_string())
    );
}

#[test]
fn unrelated_names_are_allowed() {
    let rules = settings(&[("sid", "v1")], &["tracker"]);
    assert_eq!(
        rules.verdict(&CookieChange::added(cookie("theme", "dark"))),
        Verdict::Allow
    );
}

#[tokio::test]
async fn empty_store_loads_default_settings() {
    assert_eq!(store().load().await.expect("load"), PolicySettings::default());
}

#[tokio::test]
async fn toggle_lock_round_trips() {
    let store = store();
    assert!(store.toggle_lock("sid", "v1").await.expect("lock"));
    assert_eq!(
        store.load().await.expect("load").locked_value("sid"),
        Some("v1")
    );
    assert!(!store.toggle_lock("sid", "v2").await.expect("unlock"));
    assert!(!store.load().await.expect("load").is_locked("sid"));
}

#[tokio::test]
async fn blacklist_keeps_names_unique() {
    let store = store();
    assert!(store.add_to_blacklist(" tracker ").await.expect("add"));
    assert!(!store.add_to_blacklist("tracker").await.expect("dup"));
    assert_eq!(
        store.load().await.expect("load").blacklisted_cookies,
        vec!["tracker".to_string()]
    );
    assert!(!store.toggle_blacklist("tracker").await.expect("toggle"));
    assert!(store
        .load()
        .await
        .expect("load")
        .blacklisted_cookies
        .is_empty());
}

#[tokio::test]
async fn saving_one_rule_set_leaves_the_other_alone() {
    let store = store();
    store.lock("sid", "v1").await.expect("lock");
    store.add_to_blacklist("tracker").await.expect("blacklist");
    store.unlock("sid").await.expect("unlock");
    let loaded = store.load().await.expect("load");
    assert!(loaded.locked_cookies.is_empty());
    assert!(loaded.is_blacklisted("tracker"));
}

#[tokio::test]
async fn empty_rule_names_are_rejected() {
    let err = store().lock("  ", "v").await.expect_err("empty name");
    assert!(matches!(err, CookieMasterError::InvalidInput(_)));
}
