//! Command handler table.

use super::Handler;
use std::collections::HashMap;
use std::sync::Arc;

/// Ordered handlers per command keyword.
///
/// Handlers for one command run in the order they were added. Keywords are
/// stored upper-cased.
#[derive(Default, Clone)]
pub struct HandlerTable {
    handlers: HashMap<String, Vec<Arc<dyn Handler>>>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handler` to the list for `command`.
    pub fn add(&mut self, command: &str, handler: Arc<dyn Handler>) {
        self.handlers
            .entry(command.to_ascii_uppercase())
            .or_default()
            .push(handler);
    }

    /// Remove `handler` (by identity) from the list for `command`.
    pub fn remove(&mut self, command: &str, handler: &Arc<dyn Handler>) -> bool {
        let key = command.to_ascii_uppercase();
        let Some(list) = self.handlers.get_mut(&key) else {
            return false;
        };
        let before = list.len();
        list.retain(|existing| !Arc::ptr_eq(existing, handler));
        let removed = list.len() != before;
        if list.is_empty() {
            self.handlers.remove(&key);
        }
        removed
    }

    /// Handlers for `command`, empty if none are registered.
    pub fn get(&self, command: &str) -> &[Arc<dyn Handler>] {
        self.handlers
            .get(&command.to_ascii_uppercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}
