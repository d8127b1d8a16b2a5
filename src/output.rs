//! Output formatting and display utilities

use std::io::{self, Write};

use serde::Serialize;

use crate::config::OutputConfig;
use crate::cookie::Tab;
use crate::error::Result;
use crate::i18n;
use crate::inspector::{AppState, ListStatus, Notice, RowView};
use crate::policy::PolicySettings;

const LOCK_MARKER: &str = "🔒";
const BLACKLIST_MARKER: &str = "🚫";

/// Output writer for stdout / stderr
pub struct OutputWriter {
    config: OutputConfig,
}

impl OutputWriter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn json(&self) -> bool {
        self.config.format_json
    }

    /// Write content to stdout
    pub fn write(&self, content: &str) -> Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(content.as_bytes())?;
        if !content.ends_with('\n') {
            stdout.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Write verbose information (if enabled)
    pub fn write_verbose(&self, message: &str) -> Result<()> {
        if self.config.verbose && !self.config.silent {
            eprintln!("* {}", message);
        }
        Ok(())
    }

    /// Write error message
    pub fn write_error(&self, message: &str) -> Result<()> {
        if !self.config.silent {
            eprintln!("cookie-master: error: {}", message);
        }
        Ok(())
    }

    /// Show a notice: toasts on stdout, alerts on stderr
    pub fn write_notice(&self, notice: &Notice) -> Result<()> {
        let Some(message) = notice.message() else {
            return Ok(());
        };
        let text = i18n::localize_message(message);
        match notice {
            Notice::Alert(_) => self.write_error(&text),
            _ if self.config.silent => Ok(()),
            _ => self.write(&text),
        }
    }
}

#[derive(Serialize)]
struct ListReport<'a> {
    tab: Option<&'a Tab>,
    #[serde(flatten)]
    status: &'a ListStatus,
    filter: &'a str,
    rows: Vec<RowView>,
}

/// The cookie list as JSON
pub fn list_json(state: &AppState) -> Result<String> {
    let report = ListReport {
        tab: state.tab.as_ref(),
        status: &state.status,
        filter: &state.filter,
        rows: state.visible_rows(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// The cookie list as a table, or the status line when there is nothing to show
pub fn format_list(state: &AppState) -> String {
    if state.status != ListStatus::Ready {
        return i18n::localize_status(&state.status);
    }
    if state.no_matches() {
        return i18n::no_matches();
    }
    format_rows(&state.visible_rows())
}

/// Render rows as aligned columns: markers, name, value, domain
pub fn format_rows(rows: &[RowView]) -> String {
    let name_width = rows.iter().map(|row| row.name.chars().count()).max().unwrap_or(0);
    let value_width = rows
        .iter()
        .map(|row| row.value.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for row in rows {
        let line = format!(
            "{}{} {:<name_width$}  {:<value_width$}  {}",
            marker(row.locked, LOCK_MARKER),
            marker(row.blacklisted, BLACKLIST_MARKER),
            row.name,
            row.value,
            row.domain_label,
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn marker(on: bool, symbol: &str) -> &str {
    if on {
        symbol
    } else {
        "  "
    }
}

/// The lock and blacklist lists
pub fn format_rules(settings: &PolicySettings) -> String {
    let mut out = String::new();
    for (name, value) in &settings.locked_cookies {
        out.push_str(&format!("{} {} = {}\n", LOCK_MARKER, name, value));
    }
    for name in &settings.blacklisted_cookies {
        out.push_str(&format!("{} {}\n", BLACKLIST_MARKER, name));
    }
    out
}

pub fn rules_json(settings: &PolicySettings) -> Result<String> {
    Ok(serde_json::to_string_pretty(settings)?)
}
