//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("account.username is required")]
    MissingUsername,
    #[error("connection.host is required")]
    MissingHost,
    #[error("connection.channel must start with '#', got '{0}'")]
    InvalidChannel(String),
    #[error("rate_limits.normal_limit must be at least 2, got {0}")]
    NormalLimitTooLow(usize),
    #[error("rate_limits.elevated_limit ({elevated}) is below normal_limit ({normal})")]
    ElevatedBelowNormal { normal: usize, elevated: usize },
    #[error("rate_limits.window_secs must be greater than 0")]
    ZeroWindow,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.account.username.trim().is_empty() {
        errors.push(ValidationError::MissingUsername);
    }
    if config.connection.host.trim().is_empty() {
        errors.push(ValidationError::MissingHost);
    }
    if let Some(ref channel) = config.connection.channel {
        if !channel.starts_with('#') {
            errors.push(ValidationError::InvalidChannel(channel.clone()));
        }
    }

    // One slot is always held back, so a limit of 1 could never send.
    let limits = &config.rate_limits;
    if limits.normal_limit < 2 {
        errors.push(ValidationError::NormalLimitTooLow(limits.normal_limit));
    }
    if limits.elevated_limit < limits.normal_limit {
        errors.push(ValidationError::ElevatedBelowNormal {
            normal: limits.normal_limit,
            elevated: limits.elevated_limit,
        });
    }
    if limits.window_secs == 0 {
        errors.push(ValidationError::ZeroWindow);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
