//! cookie-master - inspect and pin the cookies of the active browser tab
//!
//! A cookie inspector (list, filter, edit, create, delete, copy) paired with
//! a change interceptor that enforces two per-name rules on every cookie
//! mutation: locked cookies are held at a fixed value and blacklisted cookies
//! are deleted as soon as they appear. The browser is reached through the
//! traits in [`host`]; a SQLite-backed jar and storage area stand in for it
//! on the command line.

pub mod cli;
pub mod config;
pub mod cookie;
pub mod error;
pub mod exit_code;
pub mod host;
pub mod i18n;
pub mod inspector;
pub mod interceptor;
pub mod logging;
pub mod output;
pub mod policy;
pub mod utils;

pub use error::{CookieMasterError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
