//! SQLite-backed key-value storage area
//!
//! Values are stored as JSON text, one row per key.

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};

use super::StorageArea;
use crate::error::{CookieMasterError, Result};

pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS storage (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CookieMasterError::Storage("storage lock poisoned".to_string()))
    }
}

#[async_trait]
impl StorageArea for SqliteStorage {
    async fn get(&self, defaults: Map<String, Value>) -> Result<Map<String, Value>> {
        let conn = self.connection()?;
        let mut items = Map::new();
        for (key, default) in defaults {
            let stored: Option<String> = conn
                .query_row(
                    "SELECT value FROM storage WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            let value = match stored {
                Some(text) => serde_json::from_str(&text).map_err(|e| {
                    CookieMasterError::Storage(format!("Corrupt value for '{}': {}", key, e))
                })?,
                None => default,
            };
            items.insert(key, value);
        }
        Ok(items)
    }

    async fn set(&self, items: Map<String, Value>) -> Result<()> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        for (key, value) in &items {
            tx.execute(
                "INSERT OR REPLACE INTO storage (key, value) VALUES (?1, ?2)",
                params![key, serde_json::to_string(value)?],
            )?;
        }
        tx.commit()?;
        log::debug!("Stored {} storage keys", items.len());
        Ok(())
    }
}
