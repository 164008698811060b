//! Configuration module for lazysql.
//!
//! Handles loading configuration from:
//! - Default values
//! - Config file (~/.config/lazysql/config.toml)
//! - Host list (~/.config/lazysql/hosts.yaml)
//! - `LAZYSQL_CONFIG_DIR` to relocate both

mod hosts;
mod schema;

pub use hosts::{load_hosts, load_hosts_from, save_hosts_to, validate_port, DbType, Host};
pub use schema::{
    Config, ConnectionConfig, DisplayConfig, EditorConfig, HistoryConfig, LoggingConfig,
};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Returns the config directory path.
///
/// Checks `LAZYSQL_CONFIG_DIR` first, then falls back to the system default
/// (~/.config/lazysql on Linux).
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("LAZYSQL_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|p| p.join("lazysql"))
}

/// Returns the config file path (~/.config/lazysql/config.toml)
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.toml"))
}

/// Returns the host list path (~/.config/lazysql/hosts.yaml)
pub fn hosts_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("hosts.yaml"))
}

/// Returns the query history path (~/.config/lazysql/history.json)
pub fn history_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("history.json"))
}

/// Returns the log file path (~/.config/lazysql/lazysql.log)
pub fn log_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("lazysql.log"))
}

/// Load configuration from the default path or return defaults
pub fn load_config() -> Result<Config> {
    match config_path() {
        Some(path) if path.exists() => load_config_from(&path),
        _ => Ok(Config::default()),
    }
}

/// Load configuration from a specific path
pub fn load_config_from(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.editor.tab_size, 4);
        assert_eq!(config.editor.key_sequence_timeout_ms, 500);
        assert!(config.editor.syntax_highlighting);
        assert_eq!(config.display.min_column_width, 12);
        assert_eq!(config.connection.row_limit, 9999);
    }

    #[test]
    #[serial]
    fn test_paths_follow_env_override() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("LAZYSQL_CONFIG_DIR", dir.path());

        assert_eq!(config_dir().unwrap(), dir.path());
        assert_eq!(hosts_path().unwrap(), dir.path().join("hosts.yaml"));
        assert!(config_path().unwrap().ends_with("config.toml"));
        assert!(log_path().unwrap().starts_with(dir.path()));
        // No config file yet: defaults.
        assert_eq!(load_config().unwrap(), Config::default());

        std::env::remove_var("LAZYSQL_CONFIG_DIR");
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[connection]
row_limit = 100

[editor]
key_sequence_timeout_ms = 300
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.connection.row_limit, 100);
        assert_eq!(config.connection.default_port, 5432);
        assert_eq!(config.editor.key_sequence_timeout().as_millis(), 300);
        assert_eq!(config.editor.tab_size, 4);
    }

    #[test]
    fn test_invalid_config_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[editor\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("config.toml"));
    }
}
