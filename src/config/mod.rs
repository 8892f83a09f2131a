//! Configuration management for querysh
//!
//! This module handles loading and validating the TOML configuration file:
//! - `[connection]` database path and command timeout
//! - `[display]` row window, column width and control-character substitutes
//! - `[history]` line editor history
//! - `[logging]` log level and timestamps
//! - `[queries]` named command templates, in declaration order
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Default configuration file name, looked up in the user config directory
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Directory under the user config directory holding querysh files
pub const APP_DIR: &str = "querysh";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Connection configuration
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,

    /// History configuration
    #[serde(default)]
    pub history: HistoryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Named command templates (`name = "SELECT ... {placeholder} ..."`)
    #[serde(default)]
    pub queries: toml::Table,
}

/// Connection-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Database to open (a SQLite file path, or `:memory:`)
    #[serde(default = "default_database")]
    pub database: String,

    /// Command timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Display and output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Rows fetched and printed per result set (0 = all)
    #[serde(default = "default_rows_to_print")]
    pub rows_to_print: usize,

    /// Maximum characters per column (0 = no truncation)
    #[serde(default = "default_column_display_width")]
    pub column_display_width: usize,

    /// Text shown for NULL values (`OFF` = empty)
    #[serde(default = "default_null_string")]
    pub null_string: String,

    /// Text replacing newlines in values (`OFF` = keep newlines)
    #[serde(default = "default_newline_replacement")]
    pub newline_replacement: String,

    /// Text replacing tabs in values (`OFF` = keep tabs)
    #[serde(default = "default_tab_replacement")]
    pub tab_replacement: String,

    /// Rows written per batch when exporting to CSV
    #[serde(default = "default_csv_batch_size")]
    pub csv_batch_size: usize,

    /// Enable colored output
    #[serde(default = "default_color_output")]
    pub color_output: bool,
}

/// Command history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of history entries
    #[serde(default = "default_max_history_size")]
    pub max_size: usize,

    /// Path to history file
    #[serde(default = "default_history_file")]
    pub file_path: PathBuf,

    /// Enable history persistence
    #[serde(default = "default_persist_history")]
    pub persist: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_database() -> String {
    crate::connection::sqlite::MEMORY_DATABASE.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_rows_to_print() -> usize {
    100
}

fn default_column_display_width() -> usize {
    100
}

fn default_null_string() -> String {
    "[NULL]".to_string()
}

fn default_newline_replacement() -> String {
    "[\\n]".to_string()
}

fn default_tab_replacement() -> String {
    "[\\t]".to_string()
}

fn default_csv_batch_size() -> usize {
    10_000
}

fn default_color_output() -> bool {
    true
}

fn default_max_history_size() -> usize {
    1000
}

fn default_history_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".querysh_history")
}

fn default_persist_history() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            timeout: default_timeout(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            rows_to_print: default_rows_to_print(),
            column_display_width: default_column_display_width(),
            null_string: default_null_string(),
            newline_replacement: default_newline_replacement(),
            tab_replacement: default_tab_replacement(),
            csv_batch_size: default_csv_batch_size(),
            color_output: default_color_output(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_history_size(),
            file_path: default_history_file(),
            persist: default_persist_history(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::InvalidFormat(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Locate and load the configuration file.
    ///
    /// The given path is tried as-is first, then relative to the user config
    /// directory (`$XDG_CONFIG_HOME/querysh` or its platform equivalent).
    /// When no file is found the defaults are returned.
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        match Self::resolve_path(path) {
            Some(found) => {
                tracing::debug!("Loading configuration from {}", found.display());
                Self::from_file(found)
            }
            None => {
                if let Some(requested) = path {
                    tracing::debug!(
                        "No configuration file at {}, using defaults",
                        requested.display()
                    );
                }
                Ok(Self::default())
            }
        }
    }

    /// Find the configuration file that [`load_from_file`](Self::load_from_file) would read
    pub fn resolve_path(path: Option<&Path>) -> Option<PathBuf> {
        let requested = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        if requested.is_file() {
            return Some(requested.to_path_buf());
        }
        let candidate = Self::config_dir()?.join(requested);
        candidate.is_file().then_some(candidate)
    }

    /// Directory holding querysh configuration
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR))
    }

    /// Serialize the configuration to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        if self.display.csv_batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "display.csv_batch_size".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        for (name, template) in &self.queries {
            if !template.is_str() {
                return Err(ConfigError::InvalidValue {
                    field: format!("queries.{name}"),
                    value: template.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Named command templates in declaration order.
    ///
    /// Entries that are not strings are skipped; [`validate`](Self::validate)
    /// reports them.
    pub fn named_commands(&self) -> Vec<(String, String)> {
        self.queries
            .iter()
            .filter_map(|(name, template)| {
                template
                    .as_str()
                    .map(|text| (name.clone(), text.to_string()))
            })
            .collect()
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
