use super::SqliteCookieJar;
use crate::cookie::{ChangeCause, GetAllDetails, RemoveDetails, SetDetails};
use crate::error::CookieMasterError;
use crate::host::CookieApi;
use crate::utils::now_secs;
use tempfile::tempdir;

fn write(url: &str, name: &str, value: &str) -> SetDetails {
    SetDetails {
        url: url.to_string(),
        name: name.to_string(),
        value: value.to_string(),
        ..SetDetails::default()
    }
}

fn query(url: &str) -> GetAllDetails {
    GetAllDetails {
        url: url.to_string(),
        store_id: None,
    }
}

#[tokio::test]
async fn set_without_domain_creates_host_only_cookie() {
    let jar = SqliteCookieJar::open_in_memory().expect("jar");
    let cookie = jar
        .set(&write("https://example.com/app/page", "sid", "1"))
        .await
        .expect("set")
        .expect("stored");
    assert!(cookie.host_only);
    assert_eq!(cookie.domain, "example.com");
    assert_eq!(cookie.path, "/app");
    assert_eq!(cookie.store_id, "0");

    let sub = jar.get_all(&query("https://www.example.com/app/")).await.expect("list");
    assert!(sub.is_empty());
}

#[tokio::test]
async fn set_with_domain_creates_domain_cookie_visible_to_subdomains() {
    let jar = SqliteCookieJar::open_in_memory().expect("jar");
    let mut details = write("https://example.com/", "sid", "1");
    details.domain = Some("example.com".to_string());
    details.path = Some("/".to_string());
    let cookie = jar.set(&details).await.expect("set").expect("stored");
    assert_eq!(cookie.domain, ".example.com");
    assert!(!cookie.host_only);

    let cookies = jar.get_all(&query("https://www.example.com/")).await.expect("list");
    assert_eq!(cookies.len(), 1);
}

#[tokio::test]
async fn set_rejects_mismatched_domain() {
    let jar = SqliteCookieJar::open_in_memory().expect("jar");
    let mut details = write("https://example.com/", "sid", "1");
    details.domain = Some(".other.org".to_string());
    let err = jar.set(&details).await.expect_err("rejected");
    assert!(matches!(err, CookieMasterError::Rejected(_)));
}

#[tokio::test]
async fn set_rejects_secure_cookie_over_http_and_bad_names() {
    let jar = SqliteCookieJar::open_in_memory().expect("jar");
    let mut details = write("http://example.com/", "sid", "1");
    details.secure = true;
    assert!(matches!(
        jar.set(&details).await,
        Err(CookieMasterError::Rejected(_))
    ));
    assert!(matches!(
        jar.set(&write("http://example.com/", "a;b", "1")).await,
        Err(CookieMasterError::Rejected(_))
    ));
    assert!(matches!(
        jar.set(&write("not a url", "a", "1")).await,
        Err(CookieMasterError::InvalidUrl(_))
    ));
}

#[tokio::test]
async fn overwrite_emits_removal_then_addition() {
    let jar = SqliteCookieJar::open_in_memory().expect("jar");
    jar.set(&write("https://example.com/", "sid", "1"))
        .await
        .expect("set");

    let mut rx = jar.subscribe();
    jar.set(&write("https://example.com/", "sid", "2"))
        .await
        .expect("set");

    let first = rx.try_recv().expect("overwrite event");
    assert!(first.removed);
    assert_eq!(first.cause, ChangeCause::Overwrite);
    assert_eq!(first.cookie.value, "1");

    let second = rx.try_recv().expect("added event");
    assert!(!second.removed);
    assert_eq!(second.cookie.value, "2");
}

#[tokio::test]
async fn expiry_in_the_past_deletes_cookie() {
    let jar = SqliteCookieJar::open_in_memory().expect("jar");
    jar.set(&write("https://example.com/", "sid", "1"))
        .await
        .expect("set");
    let mut rx = jar.subscribe();

    let mut details = write("https://example.com/", "sid", "1");
    details.expiration_date = Some(now_secs() - 60.0);
    let stored = jar.set(&details).await.expect("set");
    assert!(stored.is_none());

    let event = rx.try_recv().expect("event");
    assert_eq!(event.cause, ChangeCause::ExpiredOverwrite);
    let cookies = jar.get_all(&query("https://example.com/")).await.expect("list");
    assert!(cookies.is_empty());
}

#[tokio::test]
async fn remove_prefers_longest_matching_path() {
    let jar = SqliteCookieJar::open_in_memory().expect("jar");
    let mut root = write("https://example.com/", "sid", "root");
    root.path = Some("/".to_string());
    let mut docs = write("https://example.com/", "sid", "docs");
    docs.path = Some("/docs".to_string());
    jar.set(&root).await.expect("set root");
    jar.set(&docs).await.expect("set docs");

    let mut rx = jar.subscribe();
    let removed = jar
        .remove(&RemoveDetails {
            url: "https://example.com/docs".to_string(),
            name: "sid".to_string(),
            store_id: None,
        })
        .await
        .expect("remove")
        .expect("removed");
    assert_eq!(removed.value, "docs");
    let event = rx.try_recv().expect("event");
    assert!(event.removed);
    assert_eq!(event.cause, ChangeCause::Explicit);

    let left = jar.get_all(&query("https://example.com/docs")).await.expect("list");
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].value, "root");
}

#[tokio::test]
async fn stores_are_partitioned() {
    let jar = SqliteCookieJar::open_in_memory().expect("jar");
    let mut private = write("https://example.com/", "sid", "private");
    private.store_id = Some("1".to_string());
    jar.set(&private).await.expect("set");

    let default_store = jar.get_all(&query("https://example.com/")).await.expect("list");
    assert!(default_store.is_empty());
    let private_store = jar
        .get_all(&GetAllDetails {
            url: "https://example.com/".to_string(),
            store_id: Some("1".to_string()),
        })
        .await
        .expect("list");
    assert_eq!(private_store.len(), 1);
}

#[tokio::test]
async fn jar_persists_across_reopen() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("nested").join("cookies.db");
    {
        let jar = SqliteCookieJar::open(&path).expect("jar");
        jar.set(&write("https://example.com/", "sid", "1"))
            .await
            .expect("set");
    }
    let jar = SqliteCookieJar::open(&path).expect("reopen");
    let cookies = jar.get_all(&query("https://example.com/")).await.expect("list");
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].value, "1");
}
