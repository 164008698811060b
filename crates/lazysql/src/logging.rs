//! File logging.
//!
//! The terminal belongs to the UI, so traces go to `lazysql.log` in the config
//! directory. `LAZYSQL_LOG` overrides the configured filter.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "LAZYSQL_LOG";

/// Builds the filter from `LAZYSQL_LOG`, falling back to `default_level`.
pub fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber writing to `path`.
pub fn init(default_level: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(build_filter(default_level))
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!(path = ?path, version = env!("CARGO_PKG_VERSION"), "lazysql starting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_filter_falls_back_on_bad_level() {
        std::env::remove_var(LOG_ENV);
        assert_eq!(build_filter("debug").to_string(), "debug");
        assert_eq!(build_filter("not[valid").to_string(), "info");
    }

    #[test]
    #[serial]
    fn test_env_overrides_level() {
        std::env::set_var(LOG_ENV, "lazysql=trace");
        assert_eq!(build_filter("info").to_string(), "lazysql=trace");
        std::env::remove_var(LOG_ENV);
    }
}
