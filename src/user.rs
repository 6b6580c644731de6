//! Channel participant identity.

use chrono::{DateTime, Utc};

/// Normalize a username for roster keys and comparisons.
#[inline]
pub fn normalize(username: &str) -> String {
    username.to_lowercase()
}

/// Case-insensitive username comparison.
pub fn same_user(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// A known participant of the joined channel.
///
/// Identity is fixed at construction; only the moderator flag changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUser {
    username: String,
    channel: String,
    moderator: bool,
    joined_at: DateTime<Utc>,
}

impl ChatUser {
    /// A non-moderator user first seen now.
    pub fn new(username: impl Into<String>, channel: impl Into<String>) -> Self {
        Self::with_moderator(username, channel, false)
    }

    pub fn with_moderator(
        username: impl Into<String>,
        channel: impl Into<String>,
        moderator: bool,
    ) -> Self {
        Self {
            username: username.into(),
            channel: channel.into(),
            moderator,
            joined_at: Utc::now(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn is_moderator(&self) -> bool {
        self.moderator
    }

    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    pub fn set_moderator(&mut self, moderator: bool) {
        self.moderator = moderator;
    }

    /// `true` when this user owns the channel (username equals channel name
    /// without the leading `#`, ignoring case).
    pub fn is_streamer(&self) -> bool {
        same_user(&self.username, self.channel.trim_start_matches('#'))
    }
}
