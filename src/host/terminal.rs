//! Host surfaces for running the inspector from a terminal

use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::{Clipboard, Prompt, TabApi};
use crate::cookie::Tab;
use crate::error::Result;
use crate::i18n;
use crate::inspector::Message;

/// Tab supplied up front, e.g. from the command line
#[derive(Debug, Clone, Default)]
pub struct FixedTab {
    tab: Option<Tab>,
}

impl FixedTab {
    pub fn new(tab: Option<Tab>) -> Self {
        Self { tab }
    }
}

#[async_trait]
impl TabApi for FixedTab {
    async fn active_tab(&self) -> Result<Option<Tab>> {
        Ok(self.tab.clone())
    }
}

/// Clipboard that asks the terminal to copy via the OSC 52 escape sequence
#[derive(Debug, Clone, Copy, Default)]
pub struct Osc52Clipboard;

impl Osc52Clipboard {
    pub fn sequence(text: &str) -> String {
        format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
    }
}

#[async_trait]
impl Clipboard for Osc52Clipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(Self::sequence(text).as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

/// Reads a y/N answer from standard input
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn confirm(&self, question: &Message) -> bool {
        eprint!("{} [y/N] ", i18n::localize_message(question));
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

/// Answers yes to every question (`--yes`)
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Prompt for AssumeYes {
    fn confirm(&self, _question: &Message) -> bool {
        true
    }
}
