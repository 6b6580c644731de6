//! Background drain loop for the pending queue.

use super::{PendingQueue, RateLimiter};
use crate::membership::Membership;
use crate::transport::Transport;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Drains the pending queue through the rate limiter.
///
/// Runs until the transport reports disconnected. There is no other stop
/// signal; the owner joins the returned handle after disconnecting.
pub struct OutboundPacer {
    transport: Arc<dyn Transport>,
    limiter: Arc<RateLimiter>,
    queue: Arc<PendingQueue>,
    membership: Arc<Membership>,
    poll_interval: Duration,
}

impl OutboundPacer {
    pub fn new(
        transport: Arc<dyn Transport>,
        limiter: Arc<RateLimiter>,
        queue: Arc<PendingQueue>,
        membership: Arc<Membership>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            transport,
            limiter,
            queue,
            membership,
            poll_interval,
        }
    }

    /// Start the loop on the current runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        info!(limit = self.limiter.limit(), "outbound pacer started");
        while self.transport.is_connected() {
            self.drain().await;
            tokio::time::sleep(self.poll_interval).await;
        }
        info!(pending = self.queue.len(), "outbound pacer stopped");
    }

    /// Send queued commands while the ledger has headroom.
    async fn drain(&self) {
        while self.limiter.has_headroom() {
            let Some(command) = self.queue.pop() else {
                return;
            };

            // The tier may have dropped since the headroom check.
            if !self.limiter.try_record_send(&command) {
                debug!("ledger saturated, requeueing");
                self.queue.push_front(command);
                return;
            }

            if let Err(e) = self.transport.send_line(&command).await {
                warn!(error = %e, %command, "send failed, command dropped");
                return;
            }

            let delay = self.limiter.pace_delay(self.membership.is_elevated());
            tokio::time::sleep(delay).await;
        }
    }
}
