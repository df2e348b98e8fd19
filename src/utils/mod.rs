//! Shared helpers: diagnostics setup and identity resolution

use std::env;
use tracing_subscriber::EnvFilter;

/// Initialize the `tracing` subscriber for binaries and tests.
///
/// The level comes from the `LOGLEVEL` environment variable (`trace`,
/// `debug`, `info`, `warn`, `error`), defaulting to `info`. Safe to call
/// more than once; only the first call installs a subscriber.
pub fn setup_logger() {
    let level = env::var("LOGLEVEL").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .try_init();
}

/// Machine name for the `{host}` log token, resolved from the
/// environment.
pub fn host_name() -> String {
    env::var("HOSTNAME")
        .or_else(|_| env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "localhost".to_string())
}

/// Account name for the `{user}` log token, resolved from the
/// environment.
pub fn user_name() -> String {
    env::var("USER")
        .or_else(|_| env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}
