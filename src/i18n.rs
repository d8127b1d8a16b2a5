use crate::error::CookieMasterError;
use crate::inspector::{Column, ListStatus, Message};
use fluent_templates::fluent_bundle::FluentValue;
use fluent_templates::{static_loader, Loader};
use std::collections::HashMap;
use unic_langid::LanguageIdentifier;

static_loader! {
    static LOCALES = {
        locales: "locales",
        fallback_language: "en-US",
        customise: |bundle| bundle.set_use_isolating(false),
    };
}

pub fn localize_error(err: &CookieMasterError) -> String {
    localize_error_in(&resolve_language(), err)
}

pub fn localize_message(message: &Message) -> String {
    localize_message_in(&resolve_language(), message)
}

pub fn localize_status(status: &ListStatus) -> String {
    localize_status_in(&resolve_language(), status)
}

/// Text shown when the filter hides every row
pub fn no_matches() -> String {
    LOCALES.lookup(&resolve_language(), "list-no-matches")
}

pub fn localize_error_in(langid: &LanguageIdentifier, err: &CookieMasterError) -> String {
    match err {
        CookieMasterError::Rejected(detail) => with_detail(langid, "error-rejected", detail),
        CookieMasterError::InvalidUrl(detail) => with_detail(langid, "error-invalid-url", detail),
        CookieMasterError::InvalidInput(detail) => {
            with_detail(langid, "error-invalid-input", detail)
        }
        CookieMasterError::UnsupportedScheme(detail) => {
            with_detail(langid, "error-unsupported-scheme", detail)
        }
        CookieMasterError::NoActiveTab => LOCALES.lookup(langid, "error-no-active-tab"),
        CookieMasterError::NotFound(detail) => with_detail(langid, "error-not-found", detail),
        CookieMasterError::Storage(detail) => with_detail(langid, "error-storage", detail),
        CookieMasterError::Database(detail) => {
            with_detail(langid, "error-storage", &detail.to_string())
        }
        CookieMasterError::Io(detail) => with_detail(langid, "error-io", &detail.to_string()),
        CookieMasterError::Json(detail) => with_detail(langid, "error-json", &detail.to_string()),
        CookieMasterError::Config(detail) => with_detail(langid, "error-config", detail),
    }
}

pub fn localize_message_in(langid: &LanguageIdentifier, message: &Message) -> String {
    match message {
        Message::Saved { name } => with_name(langid, "notice-saved", name),
        Message::SaveFailed { detail } => with_detail(langid, "notice-save-failed", detail),
        Message::ConfirmDelete { name } => with_name(langid, "notice-confirm-delete", name),
        Message::Deleted { name } => with_name(langid, "notice-deleted", name),
        Message::DeleteFailed { detail } => with_detail(langid, "notice-delete-failed", detail),
        Message::Locked { name } => with_name(langid, "notice-locked", name),
        Message::Unlocked { name } => with_name(langid, "notice-unlocked", name),
        Message::Blacklisted { name } => with_name(langid, "notice-blacklisted", name),
        Message::Unblacklisted { name } => with_name(langid, "notice-unblacklisted", name),
        Message::RuleFailed { detail } => with_detail(langid, "notice-rule-failed", detail),
        Message::RuleUnchanged { name } => with_name(langid, "notice-rule-unchanged", name),
        Message::Created { name } => with_name(langid, "notice-created", name),
        Message::CreateFailed { detail, url } => {
            let mut args = HashMap::new();
            args.insert("detail", FluentValue::from(detail.as_str()));
            args.insert("url", FluentValue::from(url.as_str()));
            LOCALES.lookup_with_args(langid, "notice-create-failed", &args)
        }
        Message::CreatePending => LOCALES.lookup(langid, "notice-create-pending"),
        Message::CreateCancelled => LOCALES.lookup(langid, "notice-create-cancelled"),
        Message::MissingNameOrDomain => LOCALES.lookup(langid, "notice-missing-name-or-domain"),
        Message::InvalidDomain { domain } => {
            let mut args = HashMap::new();
            args.insert("domain", FluentValue::from(domain.as_str()));
            LOCALES.lookup_with_args(langid, "notice-invalid-domain", &args)
        }
        Message::NoTabForCreate => LOCALES.lookup(langid, "notice-no-tab-for-create"),
        Message::Copied { column } => {
            let mut args = HashMap::new();
            args.insert("column", FluentValue::from(column_label(langid, *column)));
            LOCALES.lookup_with_args(langid, "notice-copied", &args)
        }
        Message::CopyFailed => LOCALES.lookup(langid, "notice-copy-failed"),
        Message::RowMissing { name } => with_name(langid, "notice-row-missing", name),
    }
}

pub fn localize_status_in(langid: &LanguageIdentifier, status: &ListStatus) -> String {
    match status {
        ListStatus::Loading => LOCALES.lookup(langid, "list-loading"),
        ListStatus::Ready => String::new(),
        ListStatus::Empty => LOCALES.lookup(langid, "list-empty"),
        ListStatus::NoTab => LOCALES.lookup(langid, "list-no-tab"),
        ListStatus::Unavailable { scheme } => {
            let mut args = HashMap::new();
            args.insert("scheme", FluentValue::from(scheme.as_str()));
            LOCALES.lookup_with_args(langid, "list-unavailable", &args)
        }
        ListStatus::Failed { detail } => with_detail(langid, "list-failed", detail),
    }
}

pub fn column_label(langid: &LanguageIdentifier, column: Column) -> String {
    let key = match column {
        Column::Name => "column-name",
        Column::Value => "column-value",
        Column::Domain => "column-domain",
    };
    LOCALES.lookup(langid, key)
}

fn with_detail(langid: &LanguageIdentifier, key: &str, detail: &str) -> String {
    let mut args = HashMap::new();
    args.insert("detail", FluentValue::from(detail));
    LOCALES.lookup_with_args(langid, key, &args)
}

fn with_name(langid: &LanguageIdentifier, key: &str, name: &str) -> String {
    let mut args = HashMap::new();
    args.insert("name", FluentValue::from(name));
    LOCALES.lookup_with_args(langid, key, &args)
}

pub fn resolve_language() -> LanguageIdentifier {
    for key in ["LC_ALL", "LC_MESSAGES", "LANG"] {
        if let Ok(value) = std::env::var(key) {
            if let Some(lang) = normalize_lang(value) {
                if let Ok(langid) = lang.parse::<LanguageIdentifier>() {
                    return langid;
                }
            }
        }
    }
    fallback_language()
}

fn fallback_language() -> LanguageIdentifier {
    "en-US".parse().unwrap_or_default()
}

fn normalize_lang(value: String) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let value = value.split('.').next().unwrap_or(value);
    let value = value.replace('_', "-");
    Some(value)
}
