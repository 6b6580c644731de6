//! Plugin boundary and registry.
//!
//! Plugins are plain trait objects registered under a stable identifier.
//! The registry keeps them in registration order, which is also the order
//! in which they see inbound events. Which plugins are active is decided at
//! startup from configuration, by looking identifiers up in a
//! [`PluginCatalog`] of known factories.

use crate::error::BotError;
use crate::line::RawLine;
use crate::pacing::Outbox;
use crate::storage::Storage;
use crate::user::ChatUser;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// What a plugin can reach while handling an event.
pub struct PluginContext<'a> {
    /// Id the plugin was registered under.
    pub plugin_id: &'a str,
    /// Queue for outbound commands and chat messages.
    pub outbox: &'a Outbox,
    /// Current channel name.
    pub channel: &'a str,
    pub(crate) storage: &'a Storage,
}

impl PluginContext<'_> {
    /// Path of this plugin's data file `index`.
    pub fn file_path(&self, index: u32) -> Result<PathBuf, BotError> {
        self.storage.file_path(self.plugin_id, index)
    }

    /// Open this plugin's database `index`.
    pub async fn database(&self, index: u32) -> Result<SqlitePool, BotError> {
        self.storage.database(self.plugin_id, index).await
    }
}

/// Event handler loaded into the bot.
///
/// Both hooks receive whether an earlier plugin already handled the event
/// and return whether this plugin handled it. Returning `true` does not stop
/// later plugins from running.
pub trait Plugin: Send + Sync {
    /// A chat message from `sender`.
    fn handle_message(
        &self,
        _ctx: &PluginContext<'_>,
        _sender: &ChatUser,
        _message: &str,
        _line: &RawLine,
        _handled: bool,
    ) -> bool {
        false
    }

    /// Any inbound line. `index` increases by one per received line.
    fn handle_raw(
        &self,
        _ctx: &PluginContext<'_>,
        _index: u64,
        _line: &RawLine,
        _handled: bool,
    ) -> bool {
        false
    }
}

/// Constructor for a plugin known to the catalog.
pub type PluginFactory = fn() -> Arc<dyn Plugin>;

/// Known plugins, by identifier.
#[derive(Default)]
pub struct PluginCatalog {
    factories: HashMap<String, PluginFactory>,
}

impl PluginCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: &str, factory: PluginFactory) -> Self {
        self.factories.insert(id.to_string(), factory);
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    fn build(&self, id: &str) -> Option<Arc<dyn Plugin>> {
        self.factories.get(id).map(|factory| factory())
    }
}

/// Active plugins in invocation order.
#[derive(Default, Clone)]
pub struct PluginRegistry {
    plugins: Vec<(String, Arc<dyn Plugin>)>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configured ids, in the configured order.
    pub fn from_config(enabled: &[String], catalog: &PluginCatalog) -> Result<Self, BotError> {
        let mut registry = Self::new();
        for id in enabled {
            let plugin = catalog
                .build(id)
                .ok_or_else(|| BotError::UnknownPlugin(id.clone()))?;
            registry.register(id, plugin)?;
        }
        info!(count = registry.len(), "plugins loaded");
        Ok(registry)
    }

    pub fn register(&mut self, id: &str, plugin: Arc<dyn Plugin>) -> Result<(), BotError> {
        if self.contains(id) {
            return Err(BotError::DuplicatePlugin(id.to_string()));
        }
        debug!(plugin = id, "plugin registered");
        self.plugins.push((id.to_string(), plugin));
        Ok(())
    }

    /// Remove a plugin. Returns `false` if it was not registered.
    pub fn unregister(&mut self, id: &str) -> bool {
        let before = self.plugins.len();
        self.plugins.retain(|(existing, _)| existing != id);
        before != self.plugins.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.plugins.iter().any(|(existing, _)| existing == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(|(id, _)| id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Plugin>)> {
        self.plugins
            .iter()
            .map(|(id, plugin)| (id.as_str(), plugin))
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
