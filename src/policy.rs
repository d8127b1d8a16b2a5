//! Lock and blacklist rules
//!
//! Rules are keyed by cookie name only, regardless of domain or path, and are
//! persisted in the host storage area under the `lockedCookies` and
//! `blacklistedCookies` keys. Every operation reads the storage afresh; no
//! copy of the rules is trusted across calls.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::cookie::{ChangeCause, CookieChange};
use crate::error::{CookieMasterError, Result};
use crate::host::StorageArea;

pub const LOCKED_KEY: &str = "lockedCookies";
pub const BLACKLIST_KEY: &str = "blacklistedCookies";

/// Snapshot of both rule sets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySettings {
    /// Cookie name to the value it is pinned to.
    #[serde(default)]
    pub locked_cookies: BTreeMap<String, String>,
    /// Names whose cookies are deleted on sight.
    #[serde(default)]
    pub blacklisted_cookies: Vec<String>,
}

/// What the interceptor must do about a change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Remove,
    Restore(String),
}

impl PolicySettings {
    pub fn is_locked(&self, name: &str) -> bool {
        self.locked_cookies.contains_key(name)
    }

    pub fn locked_value(&self, name: &str) -> Option<&str> {
        self.locked_cookies.get(name).map(String::as_str)
    }

    pub fn is_blacklisted(&self, name: &str) -> bool {
        self.blacklisted_cookies.iter().any(|n| n == name)
    }

    /// Decide how to answer a change event.
    ///
    /// The blacklist always wins over a lock. An `Overwrite` removal is not a
    /// removal for lock purposes: the replacement cookie arrives as its own
    /// event right after.
    pub fn verdict(&self, change: &CookieChange) -> Verdict {
        let name = change.cookie.name.as_str();
        if self.is_blacklisted(name) {
            return if change.removed {
                Verdict::Allow
            } else {
                Verdict::Remove
            };
        }

        match self.locked_value(name) {
            Some(_) if change.removed && change.cause == ChangeCause::Overwrite => Verdict::Allow,
            Some(locked) if change.removed || change.cookie.value != locked => {
                Verdict::Restore(locked.to_string())
            }
            _ => Verdict::Allow,
        }
    }
}

/// Persistent rule store on top of a host storage area
#[derive(Clone)]
pub struct PolicyStore {
    storage: Arc<dyn StorageArea>,
}

impl PolicyStore {
    pub fn new(storage: Arc<dyn StorageArea>) -> Self {
        Self { storage }
    }

    /// Read both rule sets, defaulting to empty ones
    pub async fn load(&self) -> Result<PolicySettings> {
        let mut defaults = Map::new();
        defaults.insert(LOCKED_KEY.to_string(), json!({}));
        defaults.insert(BLACKLIST_KEY.to_string(), json!([]));
        let items = self.storage.get(defaults).await?;
        Ok(serde_json::from_value(Value::Object(items))?)
    }

    pub async fn save_locked(&self, locked: &BTreeMap<String, String>) -> Result<()> {
        let mut items = Map::new();
        items.insert(LOCKED_KEY.to_string(), serde_json::to_value(locked)?);
        self.storage.set(items).await
    }

    pub async fn save_blacklisted(&self, names: &[String]) -> Result<()> {
        let mut items = Map::new();
        items.insert(BLACKLIST_KEY.to_string(), serde_json::to_value(names)?);
        self.storage.set(items).await
    }

    /// Pin `name` to `value`, replacing any earlier pin
    pub async fn lock(&self, name: &str, value: &str) -> Result<()> {
        let name = rule_name(name)?;
        let mut settings = self.load().await?;
        settings
            .locked_cookies
            .insert(name.to_string(), value.to_string());
        self.save_locked(&settings.locked_cookies).await?;
        log::info!("Locked cookie {} to {:?}", name, value);
        Ok(())
    }

    /// Returns whether a lock was removed
    pub async fn unlock(&self, name: &str) -> Result<bool> {
        let mut settings = self.load().await?;
        if settings.locked_cookies.remove(name).is_none() {
            return Ok(false);
        }
        self.save_locked(&settings.locked_cookies).await?;
        log::info!("Unlocked cookie {}", name);
        Ok(true)
    }

    /// Lock at `current_value` when unlocked, unlock otherwise.
    /// Returns whether the name is locked afterwards.
    pub async fn toggle_lock(&self, name: &str, current_value: &str) -> Result<bool> {
        if self.load().await?.is_locked(name) {
            self.unlock(name).await?;
            Ok(false)
        } else {
            self.lock(name, current_value).await?;
            Ok(true)
        }
    }

    /// Returns false when the name was already blacklisted
    pub async fn add_to_blacklist(&self, name: &str) -> Result<bool> {
        let name = rule_name(name)?;
        let mut settings = self.load().await?;
        if settings.is_blacklisted(name) {
            return Ok(false);
        }
        settings.blacklisted_cookies.push(name.to_string());
        self.save_blacklisted(&settings.blacklisted_cookies).await?;
        log::info!("Blacklisted cookie {}", name);
        Ok(true)
    }

    pub async fn remove_from_blacklist(&self, name: &str) -> Result<bool> {
        let mut settings = self.load().await?;
        let before = settings.blacklisted_cookies.len();
        settings.blacklisted_cookies.retain(|n| n != name);
        if settings.blacklisted_cookies.len() == before {
            return Ok(false);
        }
        self.save_blacklisted(&settings.blacklisted_cookies).await?;
        log::info!("Removed cookie {} from the blacklist", name);
        Ok(true)
    }

    /// Returns whether the name is blacklisted afterwards
    pub async fn toggle_blacklist(&self, name: &str) -> Result<bool> {
        if self.load().await?.is_blacklisted(name) {
            self.remove_from_blacklist(name).await?;
            Ok(false)
        } else {
            self.add_to_blacklist(name).await?;
            Ok(true)
        }
    }
}

fn rule_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CookieMasterError::InvalidInput(
            "cookie name must not be empty".to_string(),
        ));
    }
    Ok(name)
}

#[cfg(test)]
mod tests;
