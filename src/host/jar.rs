//! SQLite-backed cookie jar
//!
//! The table layout follows the Chromium `Cookies` database (`host_key`,
//! `expires_utc`, `is_secure`, `is_httponly`), extended with the store id and
//! the host-only flag. Every mutation is broadcast as a [`CookieChange`].

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::broadcast;
use url::Url;

use super::CookieApi;
use crate::cookie::{
    ChangeCause, Cookie, CookieChange, GetAllDetails, RemoveDetails, SetDetails, DEFAULT_STORE_ID,
};
use crate::error::{CookieMasterError, Result};
use crate::utils::{now_secs, UrlUtils};

const CHANGE_CHANNEL_CAPACITY: usize = 256;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS cookies (
    store_id TEXT NOT NULL,
    host_key TEXT NOT NULL,
    name TEXT NOT NULL,
    value TEXT NOT NULL,
    path TEXT NOT NULL,
    expires_utc REAL,
    is_secure INTEGER NOT NULL,
    is_httponly INTEGER NOT NULL,
    host_only INTEGER NOT NULL,
    PRIMARY KEY (store_id, host_key, path, name)
)";

const SELECT_COOKIES: &str = "SELECT store_id, host_key, name, value, path, expires_utc, \
     is_secure, is_httponly, host_only FROM cookies";

/// Cookie store persisted in a SQLite database
pub struct SqliteCookieJar {
    conn: Mutex<Connection>,
    changes: broadcast::Sender<CookieChange>,
}

impl SqliteCookieJar {
    /// Open (or create) a jar stored at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Self::with_connection(Connection::open(path)?)
    }

    /// Open a jar that lives only as long as this value
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(SCHEMA, [])?;
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self {
            conn: Mutex::new(conn),
            changes,
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CookieMasterError::Storage("cookie jar lock poisoned".to_string()))
    }

    fn notify(&self, changes: Vec<CookieChange>) {
        for change in changes {
            // Nobody listening is not an error.
            let _ = self.changes.send(change);
        }
    }
}

#[async_trait]
impl CookieApi for SqliteCookieJar {
    async fn get_all(&self, details: &GetAllDetails) -> Result<Vec<Cookie>> {
        let url = parse_url(&details.url)?;
        let store_id = store_or_default(details.store_id.as_deref());
        let now = now_secs();

        let (live, expired) = {
            let conn = self.connection()?;
            let (expired, live): (Vec<Cookie>, Vec<Cookie>) = load_store(&conn, store_id)?
                .into_iter()
                .partition(|cookie| cookie.is_expired_at(now));
            for cookie in &expired {
                delete_exact(&conn, cookie)?;
            }
            (live, expired)
        };

        if !expired.is_empty() {
            log::debug!("Purged {} expired cookies from store {}", expired.len(), store_id);
        }
        self.notify(
            expired
                .into_iter()
                .map(|cookie| CookieChange::removed(cookie, ChangeCause::Expired))
                .collect(),
        );

        Ok(live
            .into_iter()
            .filter(|cookie| cookie.matches_url(&url))
            .collect())
    }

    async fn set(&self, details: &SetDetails) -> Result<Option<Cookie>> {
        let cookie = build_cookie(details)?;
        let mut changes = Vec::new();

        let stored = {
            let conn = self.connection()?;
            let existing = find_exact(&conn, &cookie)?;
            if cookie.is_expired_at(now_secs()) {
                if let Some(old) = existing {
                    delete_exact(&conn, &old)?;
                    changes.push(CookieChange::removed(old, ChangeCause::ExpiredOverwrite));
                }
                None
            } else {
                if let Some(old) = existing {
                    changes.push(CookieChange::removed(old, ChangeCause::Overwrite));
                }
                upsert(&conn, &cookie)?;
                changes.push(CookieChange::added(cookie.clone()));
                Some(cookie)
            }
        };

        self.notify(changes);
        Ok(stored)
    }

    async fn remove(&self, details: &RemoveDetails) -> Result<Option<Cookie>> {
        let url = parse_url(&details.url)?;
        let store_id = store_or_default(details.store_id.as_deref());

        let removed = {
            let conn = self.connection()?;
            let target = load_store(&conn, store_id)?
                .into_iter()
                .filter(|cookie| cookie.name == details.name && cookie.matches_url(&url))
                .max_by_key(|cookie| cookie.path.len());
            if let Some(cookie) = &target {
                delete_exact(&conn, cookie)?;
            }
            target
        };

        if let Some(cookie) = &removed {
            self.notify(vec![CookieChange::removed(
                cookie.clone(),
                ChangeCause::Explicit,
            )]);
        }
        Ok(removed)
    }

    fn subscribe(&self) -> broadcast::Receiver<CookieChange> {
        self.changes.subscribe()
    }
}

fn store_or_default(store_id: Option<&str>) -> &str {
    store_id
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_STORE_ID)
}

fn parse_url(input: &str) -> Result<Url> {
    Url::parse(input)
        .map_err(|e| CookieMasterError::InvalidUrl(format!("Invalid URL '{}': {}", input, e)))
}

/// Validate a write and turn it into the cookie the jar would store
fn build_cookie(details: &SetDetails) -> Result<Cookie> {
    let url = parse_url(&details.url)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CookieMasterError::Rejected(format!(
            "Cookies cannot be set for {} URLs",
            url.scheme()
        )));
    }
    let host = url
        .host_str()
        .ok_or_else(|| CookieMasterError::InvalidUrl(format!("URL has no host: {}", url)))?
        .to_ascii_lowercase();

    if details
        .name
        .chars()
        .any(|c| c == ';' || c == '=' || c.is_control())
    {
        return Err(CookieMasterError::Rejected(format!(
            "Invalid cookie name '{}'",
            details.name
        )));
    }
    if details.value.chars().any(|c| c == ';' || c.is_control()) {
        return Err(CookieMasterError::Rejected(format!(
            "Invalid value for cookie '{}'",
            details.name
        )));
    }

    let requested_domain = details
        .domain
        .as_deref()
        .map(str::trim)
        .filter(|domain| !domain.is_empty());
    let (domain, host_only) = match requested_domain {
        Some(domain) => {
            let bare = UrlUtils::strip_leading_dot(domain).to_ascii_lowercase();
            if !UrlUtils::domain_matches(&host, &bare) {
                return Err(CookieMasterError::Rejected(format!(
                    "Failed to set cookie '{}': domain {} does not match {}",
                    details.name, domain, url
                )));
            }
            (format!(".{}", bare), false)
        }
        None => (host, true),
    };

    if details.secure && url.scheme() != "https" {
        return Err(CookieMasterError::Rejected(format!(
            "Failed to set cookie '{}': secure cookies require an https URL",
            details.name
        )));
    }

    let path = details
        .path
        .as_deref()
        .filter(|path| path.starts_with('/'))
        .map(str::to_string)
        .unwrap_or_else(|| UrlUtils::default_path(&url));

    Ok(Cookie {
        name: details.name.clone(),
        value: details.value.clone(),
        domain,
        host_only,
        path,
        secure: details.secure,
        http_only: details.http_only,
        store_id: store_or_default(details.store_id.as_deref()).to_string(),
        expiration_date: details.expiration_date,
    })
}

fn row_to_cookie(row: &Row<'_>) -> rusqlite::Result<Cookie> {
    let secure: i64 = row.get(6)?;
    let http_only: i64 = row.get(7)?;
    let host_only: i64 = row.get(8)?;
    Ok(Cookie {
        store_id: row.get(0)?,
        domain: row.get(1)?,
        name: row.get(2)?,
        value: row.get(3)?,
        path: row.get(4)?,
        expiration_date: row.get(5)?,
        secure: secure != 0,
        http_only: http_only != 0,
        host_only: host_only != 0,
    })
}

fn load_store(conn: &Connection, store_id: &str) -> Result<Vec<Cookie>> {
    let mut stmt = conn.prepare(&format!("{} WHERE store_id = ?1 ORDER BY rowid", SELECT_COOKIES))?;
    let cookies = stmt
        .query_map(params![store_id], row_to_cookie)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(cookies)
}

fn find_exact(conn: &Connection, cookie: &Cookie) -> Result<Option<Cookie>> {
    let found = conn
        .query_row(
            &format!(
                "{} WHERE store_id = ?1 AND host_key = ?2 AND path = ?3 AND name = ?4",
                SELECT_COOKIES
            ),
            params![cookie.store_id, cookie.domain, cookie.path, cookie.name],
            row_to_cookie,
        )
        .optional()?;
    Ok(found)
}

fn upsert(conn: &Connection, cookie: &Cookie) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO cookies (
            store_id, host_key, name, value, path, expires_utc, is_secure, is_httponly, host_only
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            cookie.store_id,
            cookie.domain,
            cookie.name,
            cookie.value,
            cookie.path,
            cookie.expiration_date,
            cookie.secure,
            cookie.http_only,
            cookie.host_only,
        ],
    )?;
    Ok(())
}

fn delete_exact(conn: &Connection, cookie: &Cookie) -> Result<()> {
    conn.execute(
        "DELETE FROM cookies WHERE store_id = ?1 AND host_key = ?2 AND path = ?3 AND name = ?4",
        params![cookie.store_id, cookie.domain, cookie.path, cookie.name],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests;
