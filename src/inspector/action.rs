//! Actions the user can take in the inspector

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::state::RowKey;

/// Table column, used for one-click copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Name,
    Value,
    Domain,
}

impl FromStr for Column {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" | "key" => Ok(Column::Name),
            "value" => Ok(Column::Value),
            "domain" => Ok(Column::Domain),
            _ => Err(()),
        }
    }
}

/// Fields of the synthesized "new cookie" row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
}

/// Action on a row of the cookie table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    /// Switch the row's value cell to an editor.
    Edit(RowKey),
    /// Write the edited value back to the host.
    Save { row: RowKey, value: String },
    Delete(RowKey),
    ToggleLock(RowKey),
    ToggleBlacklist(RowKey),
    /// Open the editable "new cookie" row.
    BeginCreate,
    CancelCreate,
    CreateNew(NewCookie),
    Copy { row: RowKey, column: Column },
}

/// Action on the rule lists, independent of any row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleAction {
    AddLock { name: String, value: String },
    AddBlacklist { name: String },
    RemoveLock { name: String },
    RemoveBlacklist { name: String },
}

/// Discriminant of [`RowAction`], for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Edit,
    Save,
    Delete,
    ToggleLock,
    ToggleBlacklist,
    BeginCreate,
    CancelCreate,
    CreateNew,
    Copy,
}

impl RowAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            RowAction::Edit(_) => ActionKind::Edit,
            RowAction::Save { .. } => ActionKind::Save,
            RowAction::Delete(_) => ActionKind::Delete,
            RowAction::ToggleLock(_) => ActionKind::ToggleLock,
            RowAction::ToggleBlacklist(_) => ActionKind::ToggleBlacklist,
            RowAction::BeginCreate => ActionKind::BeginCreate,
            RowAction::CancelCreate => ActionKind::CancelCreate,
            RowAction::CreateNew(_) => ActionKind::CreateNew,
            RowAction::Copy { .. } => ActionKind::Copy,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            ActionKind::Edit => "edit",
            ActionKind::Save => "save",
            ActionKind::Delete => "delete",
            ActionKind::ToggleLock => "toggle-lock",
            ActionKind::ToggleBlacklist => "toggle-blacklist",
            ActionKind::BeginCreate => "begin-create",
            ActionKind::CancelCreate => "cancel-create",
            ActionKind::CreateNew => "create",
            ActionKind::Copy => "copy",
        };
        write!(f, "{}", kind)
    }
}
