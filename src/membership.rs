//! Channel membership and privilege tracking.
//!
//! [`Membership`] holds the bot's own identity and the roster of other
//! participants. It is written only by inbound dispatch; every update is
//! idempotent so repeated delivery of the same event changes nothing.
//!
//! The roster never contains the bot's own username, which is tracked
//! separately as the current user.

use crate::user::{ChatUser, normalize, same_user};
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, trace};

/// Current user plus the roster keyed by normalized username.
#[derive(Debug, Default)]
pub struct Membership {
    roster: DashMap<String, ChatUser>,
    current: RwLock<Option<ChatUser>>,
}

impl Membership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the bot's own identity after login.
    pub fn set_current_user(&self, user: ChatUser) {
        self.roster.remove(&normalize(user.username()));
        *self.current.write() = Some(user);
    }

    pub fn current_user(&self) -> Option<ChatUser> {
        self.current.read().clone()
    }

    /// `true` when the bot currently holds moderator privilege.
    pub fn is_elevated(&self) -> bool {
        self.current
            .read()
            .as_ref()
            .is_some_and(ChatUser::is_moderator)
    }

    /// `true` if `username` is the bot itself.
    pub fn is_current(&self, username: &str) -> bool {
        self.current
            .read()
            .as_ref()
            .is_some_and(|user| same_user(user.username(), username))
    }

    /// Update the bot's own moderator flag. Returns `false` before login.
    pub fn set_current_moderator(&self, moderator: bool) -> bool {
        match self.current.write().as_mut() {
            Some(user) => {
                user.set_moderator(moderator);
                true
            }
            None => false,
        }
    }

    /// Snapshot of the roster, in no particular order.
    pub fn users(&self) -> Vec<ChatUser> {
        self.roster
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn user(&self, username: &str) -> Option<ChatUser> {
        self.roster
            .get(&normalize(username))
            .map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    /// Forget every participant (the current user is kept).
    pub fn clear_roster(&self) {
        self.roster.clear();
    }

    /// A user joined. Returns `true` if the roster gained an entry.
    pub fn on_join(&self, username: &str, channel: &str) -> bool {
        if self.is_current(username) {
            return false;
        }
        let key = normalize(username);
        if self.roster.contains_key(&key) {
            return false;
        }
        trace!(user = %key, "join");
        self.roster.insert(key.clone(), ChatUser::new(key, channel));
        true
    }

    /// A user left. Returns `true` if an entry was removed.
    pub fn on_part(&self, username: &str) -> bool {
        let removed = self.roster.remove(&normalize(username)).is_some();
        if removed {
            trace!(user = %username, "part");
        }
        removed
    }

    /// Merge a space-separated names snapshot. Returns how many were added.
    pub fn on_names(&self, names: &str, channel: &str) -> usize {
        let added = names
            .split(' ')
            .filter(|name| !name.is_empty())
            .filter(|name| self.on_join(name, channel))
            .count();
        debug!(added, total = self.len(), "names snapshot merged");
        added
    }

    /// `target` was granted operator status.
    pub fn on_op(&self, target: &str, channel: &str) {
        if self.is_current(target) {
            return;
        }
        let key = normalize(target);
        self.roster
            .entry(key.clone())
            .and_modify(|user| user.set_moderator(true))
            .or_insert_with(|| ChatUser::with_moderator(key, channel, true));
    }

    /// Resolve the sender of a chat message, recording its privilege.
    ///
    /// Creates a roster entry on first sight. Any roster entry for the bot's
    /// own name is purged afterwards.
    pub fn on_message(&self, sender: &str, moderator: bool, channel: &str) -> ChatUser {
        let resolved = if self.is_current(sender) {
            self.set_current_moderator(moderator);
            self.current_user()
        } else {
            None
        };

        let resolved = resolved.unwrap_or_else(|| {
            let key = normalize(sender);
            self.roster
                .entry(key.clone())
                .and_modify(|user| user.set_moderator(moderator))
                .or_insert_with(|| ChatUser::with_moderator(key, channel, moderator))
                .value()
                .clone()
        });

        self.purge_current();
        resolved
    }

    fn purge_current(&self) {
        let name = self
            .current
            .read()
            .as_ref()
            .map(|user| normalize(user.username()));
        if let Some(name) = name {
            self.roster.remove(&name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAN: &str = "#chan";

    fn logged_in() -> Membership {
        let membership = Membership::new();
        membership.set_current_user(ChatUser::new("PaceBot", CHAN));
        membership
    }

    #[test]
    fn join_is_idempotent() {
        let membership = logged_in();
        assert!(membership.on_join("Alice", CHAN));
        assert!(!membership.on_join("alice", CHAN));
        assert_eq!(membership.len(), 1);
        assert_eq!(membership.user("ALICE").unwrap().username(), "alice");
    }

    #[test]
    fn own_join_not_in_roster() {
        let membership = logged_in();
        assert!(!membership.on_join("pacebot", CHAN));
        assert!(membership.is_empty());
    }

    #[test]
    fn part_removes_case_insensitively() {
        let membership = logged_in();
        membership.on_join("bob", CHAN);
        assert!(membership.on_part("BOB"));
        assert!(!membership.on_part("bob"));
        assert!(membership.is_empty());
    }

    #[test]
    fn names_snapshot_adds_missing() {
        let membership = logged_in();
        membership.on_join("alice", CHAN);
        let added = membership.on_names("alice bob  Carol pacebot", CHAN);
        assert_eq!(added, 2);
        assert_eq!(membership.len(), 3);
        assert!(!membership.user("carol").unwrap().is_moderator());
    }

    #[test]
    fn op_twice_sets_flag_once() {
        let membership = logged_in();
        membership.on_op("dave", CHAN);
        membership.on_op("DAVE", CHAN);
        assert_eq!(membership.len(), 1);
        assert!(membership.user("dave").unwrap().is_moderator());

        membership.on_join("erin", CHAN);
        membership.on_op("erin", CHAN);
        assert!(membership.user("erin").unwrap().is_moderator());
    }

    #[test]
    fn message_creates_and_updates_sender() {
        let membership = logged_in();
        let sender = membership.on_message("Frank", true, CHAN);
        assert_eq!(sender.username(), "frank");
        assert!(sender.is_moderator());

        let sender = membership.on_message("frank", false, CHAN);
        assert!(!sender.is_moderator());
        assert_eq!(membership.len(), 1);
    }

    #[test]
    fn message_from_self_updates_current_user() {
        let membership = logged_in();
        let sender = membership.on_message("pacebot", true, CHAN);
        assert_eq!(sender.username(), "PaceBot");
        assert!(membership.is_elevated());
        assert!(membership.is_empty());
    }

    #[test]
    fn current_moderator_requires_login() {
        let membership = Membership::new();
        assert!(!membership.set_current_moderator(true));
        assert!(!membership.is_elevated());

        let membership = logged_in();
        assert!(membership.set_current_moderator(true));
        assert!(membership.is_elevated());
    }
}
