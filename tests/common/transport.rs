//! In-memory transport.
//!
//! Records every line sent with the (tokio) time it was sent, and replays
//! inbound lines pushed with [`MockTransport::inject`].

use async_trait::async_trait;
use openbot::Transport;
use openbot::error::TransportError;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Notify, mpsc};
use tokio::time::Instant;

pub struct MockTransport {
    connected: AtomicBool,
    sent: Mutex<Vec<(Instant, String)>>,
    logins: Mutex<Vec<String>>,
    inbound_tx: mpsc::UnboundedSender<String>,
    inbound_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<String>>,
    shutdown: Notify,
    channel: RwLock<String>,
    fail_sends: AtomicBool,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        Self {
            connected: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
            logins: Mutex::new(Vec::new()),
            inbound_tx,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            shutdown: Notify::new(),
            channel: RwLock::new(String::new()),
            fail_sends: AtomicBool::new(false),
        }
    }

    /// Queue a line for the listener to read.
    pub fn inject(&self, line: &str) {
        let _ = self.inbound_tx.send(line.to_string());
    }

    /// Lines sent so far, in order.
    pub fn sent_lines(&self) -> Vec<String> {
        self.sent.lock().iter().map(|(_, line)| line.clone()).collect()
    }

    /// Lines sent so far with their send times.
    pub fn sent_timed(&self) -> Vec<(Instant, String)> {
        self.sent.lock().clone()
    }

    /// Sent lines matching `prefix`, with their send times.
    pub fn sent_with_prefix(&self, prefix: &str) -> Vec<(Instant, String)> {
        self.sent
            .lock()
            .iter()
            .filter(|(_, line)| line.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn logins(&self) -> Vec<String> {
        self.logins.lock().clone()
    }

    /// Make every subsequent `send_line` fail.
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            self.shutdown.notify_waiters();
        }
    }

    async fn send_line(&self, line: &str) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::Closed);
        }
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::Io(std::io::Error::other("scripted failure")));
        }
        self.sent.lock().push((Instant::now(), line.to_string()));
        Ok(())
    }

    async fn read_line(&self) -> Result<Option<String>, TransportError> {
        let mut rx = self.inbound_rx.lock().await;
        let shutdown = self.shutdown.notified();
        tokio::pin!(shutdown);
        shutdown.as_mut().enable();
        if !self.is_connected() {
            return Ok(None);
        }
        tokio::select! {
            line = rx.recv() => Ok(line),
            _ = shutdown => Ok(None),
        }
    }

    async fn login(&self, username: &str, _token: &str) -> Result<(), TransportError> {
        self.logins.lock().push(username.to_string());
        Ok(())
    }

    async fn join_channel(&self, channel: &str) -> Result<(), TransportError> {
        let channel = channel.trim_start_matches('#').to_lowercase();
        *self.channel.write() = format!("#{channel}");
        Ok(())
    }

    fn channel_name(&self) -> String {
        self.channel.read().clone()
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
