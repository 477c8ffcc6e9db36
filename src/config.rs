//! Configuration management for Natter
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{NatterError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Natter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Conversation storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Canned-bot behavior settings
    #[serde(default)]
    pub bot: BotConfig,

    /// IP-geolocation lookup settings
    #[serde(default)]
    pub ipinfo: IpInfoConfig,
}

/// Conversation storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Override for the history database path.
    ///
    /// When unset, the database lives in the platform data directory.
    #[serde(default)]
    pub db_path: Option<String>,
}

/// Canned-bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Minimum simulated typing delay before a reply (milliseconds)
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Maximum simulated typing delay before a reply (milliseconds)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_min_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    2000
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// IP-geolocation lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpInfoConfig {
    /// Base URL of the geolocation service.
    ///
    /// Overridable so tests can point the client at a mock server.
    #[serde(default = "default_ipinfo_api_base")]
    pub api_base: String,

    /// Request timeout in seconds
    #[serde(default = "default_ipinfo_timeout")]
    pub timeout_seconds: u64,
}

fn default_ipinfo_api_base() -> String {
    "http://ip-api.com/json".to_string()
}

fn default_ipinfo_timeout() -> u64 {
    10
}

impl Default for IpInfoConfig {
    fn default() -> Self {
        Self {
            api_base: default_ipinfo_api_base(),
            timeout_seconds: default_ipinfo_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from a file with env-var and CLI overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| NatterError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| NatterError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(api_base) = std::env::var("NATTER_IPINFO_API_BASE") {
            self.ipinfo.api_base = api_base;
        }
        if let Ok(db_path) = std::env::var("NATTER_HISTORY_DB") {
            self.storage.db_path = Some(db_path);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(db_path) = &cli.storage_path {
            self.storage.db_path = Some(db_path.clone());
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.bot.max_delay_ms < self.bot.min_delay_ms {
            return Err(NatterError::Config(format!(
                "bot.max_delay_ms ({}) must be >= bot.min_delay_ms ({})",
                self.bot.max_delay_ms, self.bot.min_delay_ms
            ))
            .into());
        }

        if self.ipinfo.api_base.trim().is_empty() {
            return Err(NatterError::Config("ipinfo.api_base cannot be empty".to_string()).into());
        }

        if self.ipinfo.timeout_seconds == 0 {
            return Err(NatterError::Config(
                "ipinfo.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands, HistoryCommand};
    use serial_test::serial;
    use tempfile::tempdir;

    fn cli_stub() -> Cli {
        Cli {
            config: None,
            verbose: false,
            storage_path: None,
            command: Commands::History {
                command: HistoryCommand::List,
            },
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bot.min_delay_ms, 500);
        assert_eq!(config.bot.max_delay_ms, 2000);
        assert_eq!(config.ipinfo.api_base, "http://ip-api.com/json");
        assert_eq!(config.ipinfo.timeout_seconds, 10);
        assert!(config.storage.db_path.is_none());
    }

    #[test]
    #[serial]
    fn test_load_missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/config.yaml", &cli_stub()).expect("load failed");
        assert_eq!(config.bot.min_delay_ms, 500);
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        let dir = tempdir().expect("tempdir failed");
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "bot:\n  min_delay_ms: 10\n  max_delay_ms: 20\nipinfo:\n  timeout_seconds: 5\n",
        )
        .expect("write failed");

        let config =
            Config::load(path.to_str().unwrap(), &cli_stub()).expect("load failed");
        assert_eq!(config.bot.min_delay_ms, 10);
        assert_eq!(config.bot.max_delay_ms, 20);
        assert_eq!(config.ipinfo.timeout_seconds, 5);
        // Unspecified sections fall back to defaults.
        assert_eq!(config.ipinfo.api_base, "http://ip-api.com/json");
    }

    #[test]
    #[serial]
    fn test_load_rejects_malformed_yaml() {
        let dir = tempdir().expect("tempdir failed");
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "bot: [not a map").expect("write failed");

        let res = Config::load(path.to_str().unwrap(), &cli_stub());
        assert!(res.is_err());
    }

    #[test]
    #[serial]
    fn test_cli_storage_path_override() {
        let mut cli = cli_stub();
        cli.storage_path = Some("/tmp/custom.db".to_string());

        let config = Config::load("/nonexistent/config.yaml", &cli).expect("load failed");
        assert_eq!(config.storage.db_path, Some("/tmp/custom.db".to_string()));
    }

    #[test]
    #[serial]
    fn test_env_api_base_override() {
        std::env::set_var("NATTER_IPINFO_API_BASE", "http://127.0.0.1:9/json");
        let config = Config::load("/nonexistent/config.yaml", &cli_stub()).expect("load failed");
        std::env::remove_var("NATTER_IPINFO_API_BASE");

        assert_eq!(config.ipinfo.api_base, "http://127.0.0.1:9/json");
    }

    #[test]
    fn test_validate_rejects_inverted_delay_range() {
        let mut config = Config::default();
        config.bot.min_delay_ms = 100;
        config.bot.max_delay_ms = 50;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_api_base() {
        let mut config = Config::default();
        config.ipinfo.api_base = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.ipinfo.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }
}
