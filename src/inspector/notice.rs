//! User-visible feedback produced by the inspector

use serde::Serialize;

use super::action::Column;

/// How a message reaches the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Notice {
    None,
    /// Short-lived confirmation.
    Toast(Message),
    /// Blocking error the user has to acknowledge.
    Alert(Message),
}

impl Notice {
    pub fn is_alert(&self) -> bool {
        matches!(self, Notice::Alert(_))
    }

    pub fn message(&self) -> Option<&Message> {
        match self {
            Notice::None => None,
            Notice::Toast(message) | Notice::Alert(message) => Some(message),
        }
    }
}

/// Every message the inspector can show; localized by [`crate::i18n`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "id", rename_all = "kebab-case")]
pub enum Message {
    Saved { name: String },
    SaveFailed { detail: String },
    ConfirmDelete { name: String },
    Deleted { name: String },
    DeleteFailed { detail: String },
    Locked { name: String },
    Unlocked { name: String },
    Blacklisted { name: String },
    Unblacklisted { name: String },
    RuleFailed { detail: String },
    RuleUnchanged { name: String },
    Created { name: String },
    CreateFailed { detail: String, url: String },
    CreatePending,
    CreateCancelled,
    MissingNameOrDomain,
    InvalidDomain { domain: String },
    NoTabForCreate,
    Copied { column: Column },
    CopyFailed,
    RowMissing { name: String },
}
