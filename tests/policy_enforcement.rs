use std::sync::Arc;
use std::time::Duration;

use cookie_master::cookie::{GetAllDetails, SetDetails};
use cookie_master::host::{CookieApi, SqliteCookieJar, SqliteStorage};
use cookie_master::interceptor::ChangeInterceptor;
use cookie_master::policy::PolicyStore;
use tempfile::tempdir;

const PAGE: &str = "https://shop.example.com/";

fn write(name: &str, value: &str) -> SetDetails {
    SetDetails {
        url: PAGE.to_string(),
        name: name.to_string(),
        value: value.to_string(),
        domain: Some("example.com".to_string()),
        path: Some("/".to_string()),
        ..SetDetails::default()
    }
}

async fn value_of(jar: &SqliteCookieJar, name: &str) -> Option<String> {
    jar.get_all(&GetAllDetails {
        url: PAGE.to_string(),
        store_id: None,
    })
    .await
    .expect("get_all")
    .into_iter()
    .find(|cookie| cookie.name == name)
    .map(|cookie| cookie.value)
}

/// Poll until `check` holds; the interceptor runs on its own task.
async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test]
async fn background_interceptor_enforces_rules_from_disk() {
    let dir = tempdir().expect("dir");
    let jar = Arc::new(SqliteCookieJar::open(&dir.path().join("Cookies")).expect("jar"));
    let storage = Arc::new(SqliteStorage::open(&dir.path().join("storage.sqlite")).expect("storage"));
    let policy = PolicyStore::new(storage.clone());
    policy.lock("session", "pinned").await.expect("lock");
    policy.add_to_blacklist("_ga").await.expect("blacklist");

    let interceptor = ChangeInterceptor::new(jar.clone(), policy.clone());
    let worker = tokio::spawn({
        let changes = jar.subscribe();
        async move { interceptor.run(changes).await }
    });

    let page: &SqliteCookieJar = &jar;
    jar.set(&write("session", "hijacked")).await.expect("set");
    jar.set(&write("_ga", "GA1.2.3")).await.expect("set");
    jar.set(&write("other", "kept")).await.expect("set");

    assert!(
        eventually(move || async move {
            value_of(page, "session").await.as_deref() == Some("pinned")
        })
        .await
    );
    assert!(eventually(move || async move { value_of(page, "_ga").await.is_none() }).await);
    assert_eq!(value_of(&jar, "other").await.as_deref(), Some("kept"));

    // Rules are read per event: unlocking takes effect without a restart.
    policy.unlock("session").await.expect("unlock");
    jar.set(&write("session", "free")).await.expect("set");
    assert!(
        eventually(move || async move {
            value_of(page, "session").await.as_deref() == Some("free")
        })
        .await
    );

    worker.abort();
}

#[tokio::test]
async fn rules_survive_reopening_the_storage() {
    let dir = tempdir().expect("dir");
    let path = dir.path().join("storage.sqlite");
    {
        let storage = Arc::new(SqliteStorage::open(&path).expect("storage"));
        let policy = PolicyStore::new(storage);
        policy.lock("sid", "1").await.expect("lock");
        policy.add_to_blacklist(" _gid ").await.expect("blacklist");
    }

    let storage = Arc::new(SqliteStorage::open(&path).expect("storage"));
    let settings = PolicyStore::new(storage).load().await.expect("load");
    assert_eq!(settings.locked_value("sid"), Some("1"));
    assert!(settings.is_blacklisted("_gid"));
}
