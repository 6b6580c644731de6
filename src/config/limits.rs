//! Outbound pacing configuration.

use serde::Deserialize;
use std::time::Duration;

use super::defaults::{
    default_elevated_delay_ms, default_elevated_limit, default_normal_limit,
    default_poll_interval_ms, default_window_secs,
};

/// Rate limit tiers and pacing intervals for the outbound queue.
///
/// The server counts every command sent within a sliding window; the
/// allowance depends on whether the bot holds moderator privilege.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Commands allowed per window at the normal tier (default: 20).
    #[serde(default = "default_normal_limit")]
    pub normal_limit: usize,
    /// Commands allowed per window at the elevated tier (default: 100).
    #[serde(default = "default_elevated_limit")]
    pub elevated_limit: usize,
    /// Sliding window length in seconds (default: 31).
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Delay between consecutive sends at the elevated tier, in ms (default: 2).
    #[serde(default = "default_elevated_delay_ms")]
    pub elevated_delay_ms: u64,
    /// Idle re-check interval of the pacer, in ms (default: 5).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            normal_limit: default_normal_limit(),
            elevated_limit: default_elevated_limit(),
            window_secs: default_window_secs(),
            elevated_delay_ms: default_elevated_delay_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn elevated_delay(&self) -> Duration {
        Duration::from_millis(self.elevated_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
