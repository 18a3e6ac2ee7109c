//! Tracing subscriber setup.
//!
//! Logs go to stderr through a non-blocking writer so they never interleave
//! with surface output on stdout. `PLAYGATE_LOG` overrides the filter.

use anyhow::{Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PLAYGATE_LOG";

/// Default filter directive. `debug` raises the playgate crates to debug.
pub fn default_directive(debug: bool) -> String {
    let level = if debug { "debug" } else { "info" };
    format!("warn,playgate={level},playgate_core={level}")
}

/// Installs the global subscriber. Keep the guard alive until exit.
///
/// # Errors
/// Returns an error if a global subscriber is already installed.
pub fn init(debug: bool) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))?;

    Ok(guard)
}
