//! Inbound line dispatch.
//!
//! Every received line is split into a [`RawLine`] and run through the
//! built-in handlers registered for its command, in registration order:
//! PRIVMSG, USERSTATE, JOIN, PART, 353, MODE, PING. The built-ins keep
//! [`Membership`] current and answer keep-alives. Afterwards the line is
//! offered to every plugin, first as a chat message (PRIVMSG only) and then
//! as a raw line.
//!
//! Malformed lines are dropped quietly: inbound data is untrusted and a bad
//! line must not take the session down.

mod channel;
mod connection;
mod context;
mod messaging;
mod registry;

pub use channel::{JoinHandler, ModeHandler, NamesHandler, PartHandler, RPL_NAMREPLY};
pub use connection::PingHandler;
pub use context::{ChatMessage, Context, Handler};
pub use messaging::{PrivmsgHandler, UserStateHandler};
pub use registry::HandlerTable;

use crate::error::{HandlerError, TransportError};
use crate::line::RawLine;
use crate::membership::Membership;
use crate::pacing::{Outbox, RateLimiter};
use crate::plugin::{PluginContext, PluginRegistry};
use crate::storage::Storage;
use crate::transport::Transport;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

/// Routes inbound lines to built-in handlers and plugins.
pub struct Dispatcher {
    table: RwLock<HandlerTable>,
    plugins: RwLock<PluginRegistry>,
    membership: Arc<Membership>,
    limiter: Arc<RateLimiter>,
    transport: Arc<dyn Transport>,
    outbox: Outbox,
    storage: Storage,
    sequence: AtomicU64,
    debug_output: bool,
}

impl Dispatcher {
    /// Create a dispatcher with the built-in handlers registered.
    pub fn new(
        membership: Arc<Membership>,
        limiter: Arc<RateLimiter>,
        transport: Arc<dyn Transport>,
        outbox: Outbox,
        storage: Storage,
        debug_output: bool,
    ) -> Self {
        let mut table = HandlerTable::new();
        table.add("PRIVMSG", Arc::new(PrivmsgHandler));
        table.add("USERSTATE", Arc::new(UserStateHandler));
        table.add("JOIN", Arc::new(JoinHandler));
        table.add("PART", Arc::new(PartHandler));
        table.add(RPL_NAMREPLY, Arc::new(NamesHandler));
        table.add("MODE", Arc::new(ModeHandler));
        table.add("PING", Arc::new(PingHandler));

        Self {
            table: RwLock::new(table),
            plugins: RwLock::new(PluginRegistry::new()),
            membership,
            limiter,
            transport,
            outbox,
            storage,
            sequence: AtomicU64::new(0),
            debug_output,
        }
    }

    /// Register an extra handler after the existing ones for `command`.
    pub fn add_handler(&self, command: &str, handler: Arc<dyn Handler>) {
        self.table.write().add(command, handler);
    }

    /// Unregister a handler previously added for `command`.
    pub fn remove_handler(&self, command: &str, handler: &Arc<dyn Handler>) -> bool {
        self.table.write().remove(command, handler)
    }

    /// Replace the active plugin set.
    pub fn set_plugins(&self, plugins: PluginRegistry) {
        *self.plugins.write() = plugins;
    }

    pub fn plugin_ids(&self) -> Vec<String> {
        self.plugins.read().ids().map(str::to_string).collect()
    }

    /// Process one raw inbound line.
    ///
    /// Only transport failures (a keep-alive reply that could not be sent)
    /// are returned; everything else is handled or ignored here.
    pub async fn dispatch(&self, raw: &str) -> Result<(), TransportError> {
        let line: RawLine = match raw.parse() {
            Ok(line) => line,
            Err(e) => {
                trace!(error = %e, "unparseable line ignored");
                return Ok(());
            }
        };

        let index = self.sequence.fetch_add(1, Ordering::Relaxed);
        let command = line.command_key();
        if self.debug_output {
            debug!(index, %command, "received");
        }

        // Cloned so the table lock is not held across handler awaits.
        let handlers = self.table.read().get(&command).to_vec();
        let channel = self.transport.channel_name();

        let mut ctx = Context {
            membership: &self.membership,
            limiter: &self.limiter,
            transport: self.transport.as_ref(),
            channel: &channel,
            chat: None,
        };

        for handler in handlers {
            match handler.handle(&mut ctx, &line).await {
                Ok(()) => {}
                Err(HandlerError::Transport(e)) => return Err(e),
                Err(e) => trace!(%command, error = %e, "line ignored"),
            }
        }

        let chat = ctx.chat.take();
        self.notify_plugins(index, &line, chat.as_ref(), &channel);
        Ok(())
    }

    fn notify_plugins(
        &self,
        index: u64,
        line: &RawLine,
        chat: Option<&ChatMessage>,
        channel: &str,
    ) {
        let plugins = self.plugins.read();

        // Each pass tracks its own handled flag.
        if let Some(chat) = chat {
            let mut handled = false;
            for (id, plugin) in plugins.iter() {
                let ctx = self.plugin_context(id, channel);
                let consumed = plugin.handle_message(&ctx, &chat.sender, &chat.text, line, handled);
                handled = consumed || handled;
            }
            if handled {
                trace!(index, "message handled by plugin");
            }
        }

        let mut handled = false;
        for (id, plugin) in plugins.iter() {
            let ctx = self.plugin_context(id, channel);
            handled = plugin.handle_raw(&ctx, index, line, handled) || handled;
        }
        if handled {
            trace!(index, command = %line.command, "line handled by plugin");
        }
    }

    fn plugin_context<'a>(&'a self, plugin_id: &'a str, channel: &'a str) -> PluginContext<'a> {
        PluginContext {
            plugin_id,
            outbox: &self.outbox,
            channel,
            storage: &self.storage,
        }
    }
}
