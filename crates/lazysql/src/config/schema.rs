//! Configuration schema definitions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub editor: EditorConfig,
    pub display: DisplayConfig,
    pub connection: ConnectionConfig,
    pub history: HistoryConfig,
    pub logging: LoggingConfig,
}

/// Query editor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Spaces inserted for Tab in Insert mode
    pub tab_size: usize,
    /// Maximum delay between the keys of `dd`, `ciw`, `gg`, ...
    pub key_sequence_timeout_ms: u64,
    /// Color SQL keywords, strings and literals
    pub syntax_highlighting: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_size: 4,
            key_sequence_timeout_ms: 500,
            syntax_highlighting: true,
        }
    }
}

impl EditorConfig {
    pub fn key_sequence_timeout(&self) -> Duration {
        Duration::from_millis(self.key_sequence_timeout_ms)
    }
}

/// Result grid settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Columns never get narrower than this
    pub min_column_width: usize,
    /// Digits reserved for row numbers
    pub row_number_width: usize,
    /// Shown in place of line breaks inside cells
    pub newline_marker: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            min_column_width: 12,
            row_number_width: 4,
            newline_marker: "⏎".to_string(),
        }
    }
}

/// Connection-related settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Port used when a PostgreSQL host entry has none
    pub default_port: u16,
    /// Maximum rows kept from one result
    pub row_limit: usize,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            default_port: 5432,
            row_limit: 9999,
            connect_timeout_secs: 10,
        }
    }
}

impl ConnectionConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Query history settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Keep history across sessions
    pub persist: bool,
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            persist: true,
            max_entries: 500,
        }
    }
}

/// Log file settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `LAZYSQL_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
