//! Host collaborator surfaces
//!
//! The interceptor and the inspector only ever talk to the browser through
//! these traits: a cookie store, a key-value storage area, the active-tab
//! query, the clipboard and a confirmation prompt. The crate ships a
//! SQLite-backed cookie jar and storage area plus terminal implementations
//! of the remaining surfaces.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::cookie::{Cookie, CookieChange, GetAllDetails, RemoveDetails, SetDetails, Tab};
use crate::error::Result;
use crate::inspector::Message;

pub mod jar;
pub mod storage;
pub mod terminal;

pub use jar::SqliteCookieJar;
pub use storage::SqliteStorage;
pub use terminal::{AssumeYes, FixedTab, Osc52Clipboard, StdinPrompt};

/// Cookie store API
#[async_trait]
pub trait CookieApi: Send + Sync {
    /// Every cookie that would be sent to `details.url` in the given store.
    async fn get_all(&self, details: &GetAllDetails) -> Result<Vec<Cookie>>;

    /// Store a cookie; `None` when the write only deleted (expiry in the past).
    async fn set(&self, details: &SetDetails) -> Result<Option<Cookie>>;

    /// Remove one cookie by URL and name; `None` when nothing matched.
    async fn remove(&self, details: &RemoveDetails) -> Result<Option<Cookie>>;

    /// Stream of every mutation made to the store from now on.
    fn subscribe(&self) -> broadcast::Receiver<CookieChange>;
}

/// Key-value storage area; each call is atomic, calls are not transactional
#[async_trait]
pub trait StorageArea: Send + Sync {
    /// Read the keys of `defaults`, falling back to their default values.
    async fn get(&self, defaults: Map<String, Value>) -> Result<Map<String, Value>>;

    async fn set(&self, items: Map<String, Value>) -> Result<()>;
}

/// Active-tab query
#[async_trait]
pub trait TabApi: Send + Sync {
    async fn active_tab(&self) -> Result<Option<Tab>>;
}

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<()>;
}

/// Blocking yes/no question put to the user
pub trait Prompt: Send + Sync {
    fn confirm(&self, question: &Message) -> bool;
}
