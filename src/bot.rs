//! Session facade.
//!
//! [`Bot`] wires the transport, limiter, pending queue, membership and
//! dispatcher together and exposes the session lifecycle:
//!
//! ```text
//! connect() -> begin_listen() -> login() -> join_channel() -> ... -> disconnect()
//! ```
//!
//! Two background tasks run per session: the listener, reading inbound
//! lines and dispatching them one at a time, and the pacer, draining the
//! pending queue. Both stop on their own once the transport disconnects;
//! [`Bot::disconnect`] waits for them.

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::{BotError, TransportError};
use crate::membership::Membership;
use crate::pacing::{OutboundPacer, Outbox, PendingQueue, RateLimiter};
use crate::plugin::PluginRegistry;
use crate::storage::Storage;
use crate::transport::Transport;
use crate::user::ChatUser;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// A chat bot session over one transport.
pub struct Bot {
    transport: Arc<dyn Transport>,
    config: Config,
    limiter: Arc<RateLimiter>,
    queue: Arc<PendingQueue>,
    membership: Arc<Membership>,
    dispatcher: Arc<Dispatcher>,
    outbox: Outbox,
    storage: Storage,
    pacer: Mutex<Option<JoinHandle<()>>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl Bot {
    pub fn new(config: Config, transport: Arc<dyn Transport>) -> Self {
        let limiter = Arc::new(RateLimiter::new(&config.rate_limits));
        let queue = Arc::new(PendingQueue::new());
        let membership = Arc::new(Membership::new());
        let outbox = Outbox::new(Arc::clone(&queue), Arc::clone(&transport));
        let storage = Storage::new(&config.storage.root);
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&membership),
            Arc::clone(&limiter),
            Arc::clone(&transport),
            outbox.clone(),
            storage.clone(),
            config.debug_output,
        ));

        Self {
            transport,
            config,
            limiter,
            queue,
            membership,
            dispatcher,
            outbox,
            storage,
            pacer: Mutex::new(None),
            listener: Mutex::new(None),
        }
    }

    /// Open the connection and request the configured capabilities.
    ///
    /// Capability requests go straight to the transport; they precede login
    /// and are not counted against the rate limit.
    pub async fn connect(&self) -> Result<(), BotError> {
        self.transport.connect().await?;
        if !self.transport.is_connected() {
            return Err(BotError::ConnectFailed(
                "transport reported disconnected after connect".to_string(),
            ));
        }

        for cap in &self.config.connection.capabilities {
            self.transport.send_line(&format!("CAP REQ :{cap}")).await?;
        }
        info!(
            capabilities = self.config.connection.capabilities.len(),
            "session connected"
        );
        Ok(())
    }

    /// Start the listener task.
    ///
    /// Lines are dispatched in arrival order. The task ends when the
    /// transport reports the connection closed.
    pub fn begin_listen(&self) -> Result<(), BotError> {
        if !self.transport.is_connected() {
            return Err(BotError::NotConnected("begin_listen"));
        }

        let mut slot = self.listener.lock();
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            warn!("listener already running");
            return Ok(());
        }

        let transport = Arc::clone(&self.transport);
        let dispatcher = Arc::clone(&self.dispatcher);
        *slot = Some(tokio::spawn(async move {
            debug!("listener started");
            loop {
                match transport.read_line().await {
                    Ok(Some(line)) => {
                        if let Err(e) = dispatcher.dispatch(&line).await {
                            warn!(error = %e, "reply failed");
                        }
                    }
                    Ok(None) => break,
                    Err(TransportError::Closed) => break,
                    Err(e) => {
                        warn!(error = %e, "read failed");
                        if !transport.is_connected() {
                            break;
                        }
                    }
                }
            }
            debug!("listener stopped");
        }));
        Ok(())
    }

    /// Authenticate and start pacing outbound traffic.
    ///
    /// The pacer is started on the first successful login only.
    pub async fn login(&self, username: &str, token: &str) -> Result<(), BotError> {
        if !self.transport.is_connected() {
            return Err(BotError::NotConnected("login"));
        }

        self.transport.login(username, token).await?;
        self.membership
            .set_current_user(ChatUser::new(username, self.transport.channel_name()));
        info!(username, "logged in");

        let mut slot = self.pacer.lock();
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            warn!("pacer already running");
            return Ok(());
        }
        let pacer = OutboundPacer::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.limiter),
            Arc::clone(&self.queue),
            Arc::clone(&self.membership),
            self.config.rate_limits.poll_interval(),
        );
        *slot = Some(pacer.spawn());
        Ok(())
    }

    pub async fn join_channel(&self, channel: &str) -> Result<(), BotError> {
        if !self.transport.is_connected() {
            return Err(BotError::NotConnected("join_channel"));
        }
        self.transport.join_channel(channel).await?;
        info!(channel = %self.transport.channel_name(), "joined");
        Ok(())
    }

    /// Close the connection and wait for the background tasks.
    ///
    /// Commands still queued stay queued.
    pub async fn disconnect(&self) {
        self.transport.disconnect().await;

        let handles = [self.listener.lock().take(), self.pacer.lock().take()];
        for handle in handles.into_iter().flatten() {
            if let Err(e) = handle.await {
                warn!(error = %e, "background task ended abnormally");
            }
        }
        info!(pending = self.queue.len(), "session closed");
    }

    /// Install the plugins that receive inbound events.
    pub fn initialize_plugins(&self, plugins: PluginRegistry) -> Result<(), BotError> {
        if !self.transport.is_connected() {
            return Err(BotError::NotConnected("initialize_plugins"));
        }
        info!(plugins = ?plugins.ids().collect::<Vec<_>>(), "plugins initialized");
        self.dispatcher.set_plugins(plugins);
        Ok(())
    }

    /// Queue a raw protocol command.
    pub fn send_command(&self, command: impl Into<String>) {
        self.outbox.send_command(command);
    }

    /// Queue a chat message to the current channel.
    pub fn send_message(&self, text: &str) {
        self.outbox.send_message(text);
    }

    /// Interactive token acquisition is not available.
    pub fn request_oauth_key(&self, reason: &str) -> Result<String, BotError> {
        error!(
            reason,
            "oauth key requested but interactive acquisition is unsupported"
        );
        Err(BotError::Unsupported("request_oauth_key"))
    }

    pub fn outbox(&self) -> Outbox {
        self.outbox.clone()
    }

    pub fn current_user(&self) -> Option<ChatUser> {
        self.membership.current_user()
    }

    /// Snapshot of known channel participants, excluding the bot.
    pub fn users(&self) -> Vec<ChatUser> {
        self.membership.users()
    }

    pub fn channel_name(&self) -> String {
        self.transport.channel_name()
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
