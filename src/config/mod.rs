//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ConnectionConfig, AccountConfig)
//! - [`limits`]: Outbound pacing configuration (RateLimitConfig)
//! - [`defaults`]: Serde default value functions
//! - [`validation`]: Startup validation of a loaded config

mod defaults;
mod limits;
mod types;
mod validation;

pub use limits::RateLimitConfig;
pub use types::{
    AccountConfig, Config, ConfigError, ConnectionConfig, PluginsConfig, StorageConfig,
    TOKEN_ENV_VAR,
};
pub use validation::{ValidationError, validate};
