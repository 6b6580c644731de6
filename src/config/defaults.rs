//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

// =============================================================================
// Connection Defaults
// =============================================================================

pub fn default_host() -> String {
    "irc.chat.twitch.tv".to_string()
}

pub fn default_port() -> u16 {
    6667
}

pub fn default_capabilities() -> Vec<String> {
    vec![
        "twitch.tv/membership".to_string(),
        "twitch.tv/commands".to_string(),
        "twitch.tv/tags".to_string(),
    ]
}

// =============================================================================
// Rate Limit Defaults
// =============================================================================

pub fn default_normal_limit() -> usize {
    20
}

pub fn default_elevated_limit() -> usize {
    100
}

pub fn default_window_secs() -> u64 {
    31
}

pub fn default_elevated_delay_ms() -> u64 {
    2
}

pub fn default_poll_interval_ms() -> u64 {
    5
}

// =============================================================================
// Storage Defaults
// =============================================================================

pub fn default_storage_root() -> String {
    ".".to_string()
}
