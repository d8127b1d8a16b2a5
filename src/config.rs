//! Configuration management for cookie-master

use std::path::PathBuf;

use crate::cookie::Tab;
use crate::utils::FileUtils;

pub const COOKIE_DB_FILE: &str = "Cookies";
pub const STORAGE_DB_FILE: &str = "storage.sqlite";

/// Output configuration
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    pub verbose: bool,
    pub silent: bool,
    pub format_json: bool,
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the cookie jar and the extension storage.
    pub home: PathBuf,
    /// Page standing in for the browser's active tab.
    pub tab: Option<Tab>,
    /// Answer yes to confirmation prompts.
    pub assume_yes: bool,
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            home: FileUtils::default_home(),
            tab: None,
            assume_yes: false,
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    pub fn cookie_db(&self) -> PathBuf {
        self.home.join(COOKIE_DB_FILE)
    }

    pub fn storage_db(&self) -> PathBuf {
        self.home.join(STORAGE_DB_FILE)
    }
}
