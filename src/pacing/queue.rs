//! Pending outbound command queue.

use crate::transport::Transport;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::trace;

/// Unbounded FIFO of raw outbound commands.
///
/// Many producers, one consumer (the pacer). Items survive a disconnect and
/// are drained again by the next pacer.
#[derive(Debug, Default)]
pub struct PendingQueue {
    items: Mutex<VecDeque<String>>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, command: String) {
        self.items.lock().push_back(command);
    }

    /// Put a command back at the head of the queue.
    pub fn push_front(&self, command: String) {
        self.items.lock().push_front(command);
    }

    pub fn pop(&self) -> Option<String> {
        self.items.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

/// Cloneable producer handle onto the pending queue.
///
/// Sending never blocks and never fails; pacing happens later.
#[derive(Clone)]
pub struct Outbox {
    queue: Arc<PendingQueue>,
    transport: Arc<dyn Transport>,
}

impl Outbox {
    pub fn new(queue: Arc<PendingQueue>, transport: Arc<dyn Transport>) -> Self {
        Self { queue, transport }
    }

    /// Queue a raw protocol command.
    pub fn send_command(&self, command: impl Into<String>) {
        let command = command.into();
        trace!(%command, "queued");
        self.queue.push(command);
    }

    /// Queue a chat message to the current channel.
    pub fn send_message(&self, text: &str) {
        self.send_command(self.transport.message_command(text));
    }

    /// Commands waiting to be paced out.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl std::fmt::Debug for Outbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outbox")
            .field("pending", &self.queue.len())
            .finish()
    }
}
