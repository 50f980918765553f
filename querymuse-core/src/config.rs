//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/querymuse/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/querymuse/` (~/.config/querymuse/)
//! - Data: `$XDG_DATA_HOME/querymuse/` (~/.local/share/querymuse/)
//! - State/Logs: `$XDG_STATE_HOME/querymuse/` (~/.local/state/querymuse/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Chat session configuration
    #[serde(default)]
    pub chat: ChatConfig,

    /// History panel configuration
    #[serde(default)]
    pub history: HistoryConfig,

    /// Results table configuration
    #[serde(default)]
    pub table: TableConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Chat session and thinking simulator configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    /// Milliseconds spent in each thinking stage
    #[serde(default = "default_stage_dwell_ms")]
    pub stage_dwell_ms: u64,

    /// Keywords that attach the sample results table to a response
    #[serde(default = "default_table_keywords")]
    pub table_keywords: Vec<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            stage_dwell_ms: default_stage_dwell_ms(),
            table_keywords: default_table_keywords(),
        }
    }
}

fn default_stage_dwell_ms() -> u64 {
    2000
}

fn default_table_keywords() -> Vec<String> {
    vec!["table".to_string(), "sales".to_string()]
}

/// History panel configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    /// Simulated search delay in milliseconds
    #[serde(default = "default_search_delay_ms")]
    pub search_delay_ms: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            search_delay_ms: default_search_delay_ms(),
        }
    }
}

fn default_search_delay_ms() -> u64 {
    300
}

/// Results table configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TableConfig {
    /// Rows per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> usize {
    10
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.table.page_size == 0 {
            return Err(Error::Config(
                "table.page_size must be at least 1".to_string(),
            ));
        }
        if self.chat.table_keywords.is_empty() {
            return Err(Error::Config(
                "chat.table_keywords must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/querymuse/config.toml` (~/.config/querymuse/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("querymuse").join("config.toml")
    }

    /// Returns the data directory path (for CSV exports)
    ///
    /// `$XDG_DATA_HOME/querymuse/` (~/.local/share/querymuse/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("querymuse")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/querymuse/` (~/.local/state/querymuse/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("querymuse")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/querymuse/querymuse.log` (~/.local/state/querymuse/querymuse.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("querymuse.log")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for CLI binaries that want explicit, stable path behavior
    /// before invoking other components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_DATA_HOME").is_err() {
            std::env::set_var("XDG_DATA_HOME", home.join(".local/share"));
        }

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}
