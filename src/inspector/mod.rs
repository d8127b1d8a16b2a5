//! Cookie inspector for the active tab
//!
//! Lists, filters, edits, creates and deletes the cookies of the active tab
//! and toggles the lock and blacklist rules. The host is the source of
//! truth: every mutation is followed by a full reload of the rules and of
//! the cookie list instead of patching the local copy.

use std::sync::Arc;

use url::Url;

use crate::cookie::{Cookie, GetAllDetails, RemoveDetails, SetDetails};
use crate::host::{Clipboard, CookieApi, Prompt, StorageArea, TabApi};
use crate::policy::PolicyStore;
use crate::utils::UrlUtils;

pub mod action;
pub mod notice;
pub mod state;

pub use action::{ActionKind, Column, NewCookie, RowAction, RuleAction};
pub use notice::{Message, Notice};
pub use state::{AppState, CreateDraft, EditDraft, ListStatus, RowKey, RowView};

const FALLBACK_CREATE_DOMAIN: &str = "example.com";

/// Host surfaces the inspector works against
#[derive(Clone)]
pub struct HostApis {
    pub cookies: Arc<dyn CookieApi>,
    pub storage: Arc<dyn StorageArea>,
    pub tabs: Arc<dyn TabApi>,
    pub clipboard: Arc<dyn Clipboard>,
    pub prompt: Arc<dyn Prompt>,
}

pub struct Inspector {
    host: HostApis,
    policy: PolicyStore,
}

impl Inspector {
    pub fn new(host: HostApis) -> Self {
        let policy = PolicyStore::new(host.storage.clone());
        Self { host, policy }
    }

    pub fn policy(&self) -> &PolicyStore {
        &self.policy
    }

    /// Fresh state for a newly opened inspector
    pub async fn open(&self) -> AppState {
        let mut state = AppState::default();
        self.reload(&mut state).await;
        state
    }

    /// Re-read rules and cookies from the host
    pub async fn reload(&self, state: &mut AppState) {
        self.load_settings(state).await;
        self.load_cookies(state).await;
    }

    pub async fn load_settings(&self, state: &mut AppState) {
        match self.policy.load().await {
            Ok(settings) => state.settings = settings,
            Err(err) => log::error!("Failed to load cookie rules: {}", err),
        }
    }

    pub async fn load_cookies(&self, state: &mut AppState) {
        state.status = ListStatus::Loading;
        state.editing = None;
        state.cookies.clear();

        let tab = match self.host.tabs.active_tab().await {
            Ok(Some(tab)) => tab,
            Ok(None) => {
                state.tab = None;
                state.status = ListStatus::NoTab;
                return;
            }
            Err(err) => {
                log::warn!("Active tab query failed: {}", err);
                state.tab = None;
                state.status = ListStatus::NoTab;
                return;
            }
        };

        if !UrlUtils::is_http_url(&tab.url) {
            state.status = ListStatus::Unavailable {
                scheme: UrlUtils::scheme_of(&tab.url).to_string(),
            };
            state.tab = None;
            return;
        }

        let query = GetAllDetails {
            url: tab.url.clone(),
            store_id: tab.cookie_store_id.clone(),
        };
        match self.host.cookies.get_all(&query).await {
            Ok(mut cookies) => {
                state::sort_cookies(&mut cookies);
                state.status = if cookies.is_empty() {
                    ListStatus::Empty
                } else {
                    ListStatus::Ready
                };
                state.cookies = cookies;
                state.tab = Some(tab);
            }
            Err(err) => {
                log::warn!("Failed to load cookies for {}: {}", tab.url, err);
                state.tab = None;
                state.status = ListStatus::Failed {
                    detail: err.to_string(),
                };
            }
        }
    }

    /// Run a row action against `state`
    pub async fn dispatch(&self, state: &mut AppState, action: RowAction) -> Notice {
        log::debug!("Inspector action: {}", action.kind());
        match action {
            RowAction::Edit(row) => self.edit(state, row).await,
            RowAction::Save { row, value } => self.save(state, row, value).await,
            RowAction::Delete(row) => self.delete(state, row).await,
            RowAction::ToggleLock(row) => self.toggle_lock(state, row).await,
            RowAction::ToggleBlacklist(row) => self.toggle_blacklist(state, row).await,
            RowAction::BeginCreate => self.begin_create(state),
            RowAction::CancelCreate => self.cancel_create(state),
            RowAction::CreateNew(cookie) => self.create(state, cookie).await,
            RowAction::Copy { row, column } => self.copy(state, row, column).await,
        }
    }

    /// Run an action from the rule lists
    pub async fn apply_rule(&self, state: &mut AppState, action: RuleAction) -> Notice {
        let result = match action {
            RuleAction::AddLock { name, value } => {
                let outcome = self.policy.lock(&name, &value).await;
                outcome.map(|()| Message::Locked {
                    name: name.trim().to_string(),
                })
            }
            RuleAction::AddBlacklist { name } => {
                let outcome = self.policy.add_to_blacklist(&name).await;
                let name = name.trim().to_string();
                outcome.map(|added| {
                    if added {
                        Message::Blacklisted { name }
                    } else {
                        Message::RuleUnchanged { name }
                    }
                })
            }
            RuleAction::RemoveLock { name } => {
                let outcome = self.policy.unlock(&name).await;
                outcome.map(|removed| {
                    if removed {
                        Message::Unlocked { name }
                    } else {
                        Message::RuleUnchanged { name }
                    }
                })
            }
            RuleAction::RemoveBlacklist { name } => {
                let outcome = self.policy.remove_from_blacklist(&name).await;
                outcome.map(|removed| {
                    if removed {
                        Message::Unblacklisted { name }
                    } else {
                        Message::RuleUnchanged { name }
                    }
                })
            }
        };

        self.reload(state).await;
        match result {
            Ok(message) => Notice::Toast(message),
            Err(err) => Notice::Alert(Message::RuleFailed {
                detail: err.to_string(),
            }),
        }
    }

    async fn row_missing(&self, state: &mut AppState, row: &RowKey) -> Notice {
        self.reload(state).await;
        Notice::Alert(Message::RowMissing {
            name: row.name.clone(),
        })
    }

    /// Re-read the cookie list and resolve `row` against the host's copy
    async fn fresh_row(&self, state: &mut AppState, row: &RowKey) -> Option<Cookie> {
        self.load_cookies(state).await;
        state.find(row).cloned()
    }

    async fn edit(&self, state: &mut AppState, row: RowKey) -> Notice {
        let Some(cookie) = self.fresh_row(state, &row).await else {
            return self.row_missing(state, &row).await;
        };
        let value = cookie.value;
        state.editing = Some(EditDraft { row, value });
        Notice::None
    }

    async fn save(&self, state: &mut AppState, row: RowKey, value: String) -> Notice {
        if state.editing.as_ref().map(|draft| &draft.row) != Some(&row) {
            return Notice::None;
        }
        let Some(cookie) = self.fresh_row(state, &row).await else {
            return self.row_missing(state, &row).await;
        };

        let details = SetDetails::replacing_value(&cookie, &value);
        let result = self.host.cookies.set(&details).await;
        self.reload(state).await;
        match result {
            Ok(Some(_)) => Notice::Toast(Message::Saved { name: row.name }),
            Ok(None) => {
                log::warn!("Saving cookie {} only deleted it: expiry passed", row.name);
                Notice::Alert(Message::SaveFailed {
                    detail: format!("cookie {} expired as it was written", row.name),
                })
            }
            Err(err) => {
                log::warn!("Saving cookie {} failed: {}", row.name, err);
                Notice::Alert(Message::SaveFailed {
                    detail: err.to_string(),
                })
            }
        }
    }

    async fn delete(&self, state: &mut AppState, row: RowKey) -> Notice {
        let Some(cookie) = self.fresh_row(state, &row).await else {
            return self.row_missing(state, &row).await;
        };
        let question = Message::ConfirmDelete {
            name: cookie.name.clone(),
        };
        if !self.host.prompt.confirm(&question) {
            return Notice::None;
        }

        let result = self
            .host
            .cookies
            .remove(&RemoveDetails::for_cookie(&cookie))
            .await;
        match result {
            Ok(Some(_)) => {
                self.reload(state).await;
                Notice::Toast(Message::Deleted { name: row.name })
            }
            Ok(None) => self.row_missing(state, &row).await,
            Err(err) => {
                log::warn!("Deleting cookie {} failed: {}", row.name, err);
                self.reload(state).await;
                Notice::Alert(Message::DeleteFailed {
                    detail: err.to_string(),
                })
            }
        }
    }

    async fn toggle_lock(&self, state: &mut AppState, row: RowKey) -> Notice {
        let Some(cookie) = self.fresh_row(state, &row).await else {
            return self.row_missing(state, &row).await;
        };
        let result = self.policy.toggle_lock(&cookie.name, &cookie.value).await;
        self.reload(state).await;
        match result {
            Ok(true) => Notice::Toast(Message::Locked { name: cookie.name }),
            Ok(false) => Notice::Toast(Message::Unlocked { name: cookie.name }),
            Err(err) => Notice::Alert(Message::RuleFailed {
                detail: err.to_string(),
            }),
        }
    }

    async fn toggle_blacklist(&self, state: &mut AppState, row: RowKey) -> Notice {
        let Some(cookie) = self.fresh_row(state, &row).await else {
            return self.row_missing(state, &row).await;
        };
        let result = self.policy.toggle_blacklist(&cookie.name).await;
        self.reload(state).await;
        match result {
            Ok(true) => Notice::Toast(Message::Blacklisted { name: cookie.name }),
            Ok(false) => Notice::Toast(Message::Unblacklisted { name: cookie.name }),
            Err(err) => Notice::Alert(Message::RuleFailed {
                detail: err.to_string(),
            }),
        }
    }

    fn begin_create(&self, state: &mut AppState) -> Notice {
        if state.create.is_some() {
            return Notice::Alert(Message::CreatePending);
        }
        let Some(tab) = state.tab.as_ref() else {
            return Notice::Alert(Message::NoTabForCreate);
        };
        let default_domain = Url::parse(&tab.url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| FALLBACK_CREATE_DOMAIN.to_string());
        state.create = Some(CreateDraft { default_domain });
        Notice::None
    }

    fn cancel_create(&self, state: &mut AppState) -> Notice {
        match state.create.take() {
            Some(_) => Notice::Toast(Message::CreateCancelled),
            None => Notice::None,
        }
    }

    async fn create(&self, state: &mut AppState, cookie: NewCookie) -> Notice {
        let domain = cookie.domain.trim().to_string();
        if cookie.name.is_empty() || domain.is_empty() {
            return Notice::Alert(Message::MissingNameOrDomain);
        }
        let Some(tab) = state.tab.clone() else {
            return Notice::Alert(Message::NoTabForCreate);
        };

        let url = match Url::parse(&tab.url)
            .map_err(|e| e.to_string())
            .and_then(|page| {
                UrlUtils::creation_url(page.scheme(), &domain).map_err(|e| e.to_string())
            }) {
            Ok(url) => url,
            Err(err) => {
                log::debug!("Rejected domain {:?}: {}", domain, err);
                return Notice::Alert(Message::InvalidDomain { domain });
            }
        };

        let details = SetDetails {
            url: url.clone(),
            name: cookie.name.clone(),
            value: cookie.value,
            domain: Some(domain),
            path: Some("/".to_string()),
            store_id: tab.cookie_store_id.clone(),
            ..SetDetails::default()
        };
        match self.host.cookies.set(&details).await {
            Ok(_) => {
                state.create = None;
                self.reload(state).await;
                Notice::Toast(Message::Created { name: cookie.name })
            }
            Err(err) => {
                log::warn!("Creating cookie {} failed: {}", cookie.name, err);
                Notice::Alert(Message::CreateFailed {
                    detail: err.to_string(),
                    url,
                })
            }
        }
    }

    async fn copy(&self, state: &mut AppState, row: RowKey, column: Column) -> Notice {
        // An unsaved draft is what the user sees in the value cell.
        let draft = state
            .editing
            .as_ref()
            .filter(|draft| draft.row == row)
            .map(|draft| draft.value.clone());
        let Some(cookie) = self.fresh_row(state, &row).await else {
            return self.row_missing(state, &row).await;
        };
        if let Some(value) = draft.clone() {
            state.editing = Some(EditDraft {
                row: row.clone(),
                value,
            });
        }
        let text = match column {
            Column::Name => cookie.name.clone(),
            Column::Value => draft.unwrap_or_else(|| cookie.value.clone()),
            Column::Domain => state::domain_label(&cookie),
        };
        if text.is_empty() {
            return Notice::None;
        }

        match self.host.clipboard.write_text(&text).await {
            Ok(()) => Notice::Toast(Message::Copied { column }),
            Err(err) => {
                log::error!("Copy to clipboard failed: {}", err);
                Notice::Toast(Message::CopyFailed)
            }
        }
    }
}
