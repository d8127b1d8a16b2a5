//! Inspector application state and its read-only projections

use std::cmp::Ordering;

use serde::Serialize;

use crate::cookie::{Cookie, Tab};
use crate::policy::PolicySettings;

/// Identity of a table row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RowKey {
    pub name: String,
    pub domain: String,
    pub path: String,
}

impl RowKey {
    pub fn of(cookie: &Cookie) -> Self {
        Self {
            name: cookie.name.clone(),
            domain: cookie.domain.clone(),
            path: cookie.path.clone(),
        }
    }

    pub fn identifies(&self, cookie: &Cookie) -> bool {
        self.name == cookie.name && self.domain == cookie.domain && self.path == cookie.path
    }
}

/// What the cookie list currently shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ListStatus {
    Loading,
    Ready,
    /// The page has no cookies.
    Empty,
    /// The active tab could not be determined.
    NoTab,
    /// The page scheme does not carry cookies (e.g. `chrome://`).
    Unavailable { scheme: String },
    Failed { detail: String },
}

/// A row in the middle of being edited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub row: RowKey,
    pub value: String,
}

/// The pending "new cookie" row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDraft {
    pub default_domain: String,
}

/// One rendered row of the cookie table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    pub key: RowKey,
    pub name: String,
    pub value: String,
    /// Domain, followed by `(path)` when the path is not `/`.
    pub domain_label: String,
    pub locked: bool,
    pub blacklisted: bool,
    pub editing: bool,
}

/// Everything the inspector knows; handed explicitly to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub tab: Option<Tab>,
    pub cookies: Vec<Cookie>,
    pub settings: PolicySettings,
    pub filter: String,
    pub status: ListStatus,
    pub editing: Option<EditDraft>,
    pub create: Option<CreateDraft>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            tab: None,
            cookies: Vec::new(),
            settings: PolicySettings::default(),
            filter: String::new(),
            status: ListStatus::Loading,
            editing: None,
            create: None,
        }
    }
}

impl AppState {
    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
    }

    pub fn find(&self, row: &RowKey) -> Option<&Cookie> {
        self.cookies.iter().find(|cookie| row.identifies(cookie))
    }

    /// Cookies whose name or domain contains the filter, case-insensitively.
    /// Order is that of the fetched list.
    pub fn filtered(&self) -> Vec<&Cookie> {
        let needle = self.filter.to_lowercase();
        self.cookies
            .iter()
            .filter(|cookie| {
                cookie.name.to_lowercase().contains(&needle)
                    || cookie.domain.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn visible_rows(&self) -> Vec<RowView> {
        self.filtered()
            .into_iter()
            .map(|cookie| {
                let key = RowKey::of(cookie);
                let editing = self.editing.as_ref().filter(|draft| draft.row == key);
                RowView {
                    name: cookie.name.clone(),
                    value: editing
                        .map(|draft| draft.value.clone())
                        .unwrap_or_else(|| cookie.value.clone()),
                    domain_label: domain_label(cookie),
                    locked: self.settings.is_locked(&cookie.name),
                    blacklisted: self.settings.is_blacklisted(&cookie.name),
                    editing: editing.is_some(),
                    key,
                }
            })
            .collect()
    }

    /// The filter hides every fetched cookie
    pub fn no_matches(&self) -> bool {
        self.status == ListStatus::Ready && self.filtered().is_empty()
    }
}

pub fn domain_label(cookie: &Cookie) -> String {
    if cookie.path == "/" {
        cookie.domain.clone()
    } else {
        format!("{} ({})", cookie.domain, cookie.path)
    }
}

/// Table ordering: by domain, then by name, ignoring case. Byte order
/// breaks ties so the result is stable across fetches.
pub fn sort_cookies(cookies: &mut [Cookie]) {
    cookies.sort_by(|a, b| {
        collate(&a.domain, &b.domain).then_with(|| collate(&a.name, &b.name))
    });
}

fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
