//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::defaults::{default_capabilities, default_host, default_port, default_storage_root};
use super::limits::RateLimitConfig;

/// Environment variable consulted when `account.token` is not set.
pub const TOKEN_ENV_VAR: &str = "OPENBOT_TOKEN";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server endpoint and channel.
    #[serde(default)]
    pub connection: ConnectionConfig,
    /// Login credentials.
    pub account: AccountConfig,
    /// Outbound pacing.
    #[serde(default)]
    pub rate_limits: RateLimitConfig,
    /// Plugins enabled at startup.
    #[serde(default)]
    pub plugins: PluginsConfig,
    /// Plugin storage location.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Log every received command at debug level.
    #[serde(default)]
    pub debug_output: bool,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Server endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// Server hostname (default: "irc.chat.twitch.tv").
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port (default: 6667).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Channel to join after login (e.g., "#somechannel").
    pub channel: Option<String>,
    /// Capabilities requested right after connecting.
    #[serde(default = "default_capabilities")]
    pub capabilities: Vec<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            channel: None,
            capabilities: default_capabilities(),
        }
    }
}

/// Login credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    pub username: String,
    /// OAuth token. Falls back to `OPENBOT_TOKEN` when absent.
    pub token: Option<String>,
}

impl AccountConfig {
    /// Token from the config file, or from the environment.
    pub fn resolved_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var(TOKEN_ENV_VAR).ok())
    }
}

/// Plugin selection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PluginsConfig {
    /// Plugin identifiers, in invocation order.
    #[serde(default)]
    pub enabled: Vec<String>,
}

/// Plugin storage location.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory under which `Databases/` and `Storage/` are created (default: ".").
    #[serde(default = "default_storage_root")]
    pub root: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}
