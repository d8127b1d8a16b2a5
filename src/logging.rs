//! Logging initialization utilities.

use env_logger::Env;

/// Initialize logging with a default filter level.
///
/// `RUST_LOG` overrides the default; `quiet` lowers it to warnings so that
/// enforcement chatter does not mix with scripted output.
pub fn init(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let env = Env::default().default_filter_or(default);
    let _ = env_logger::Builder::from_env(env).try_init();
}
