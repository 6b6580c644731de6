//! Plain TCP line transport.

use super::{MAX_LINE_LEN, Transport};
use crate::error::TransportError;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{Mutex, Notify};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tracing::{debug, info, warn};

type LineReader = FramedRead<OwnedReadHalf, LinesCodec>;
type LineWriter = FramedWrite<OwnedWriteHalf, LinesCodec>;

/// Line-framed TCP connection to a chat server.
pub struct TcpTransport {
    address: String,
    reader: Mutex<Option<LineReader>>,
    writer: Mutex<Option<LineWriter>>,
    connected: AtomicBool,
    shutdown: Notify,
    channel: RwLock<String>,
}

impl TcpTransport {
    /// Create a transport for `host:port`. Nothing is opened until `connect`.
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            address: format!("{host}:{port}"),
            reader: Mutex::new(None),
            writer: Mutex::new(None),
            connected: AtomicBool::new(false),
            shutdown: Notify::new(),
            channel: RwLock::new(String::new()),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        let stream = TcpStream::connect(&self.address).await?;
        if let Err(e) = stream.set_nodelay(true) {
            warn!(error = %e, "failed to set TCP_NODELAY");
        }

        let (read_half, write_half) = stream.into_split();
        *self.reader.lock().await = Some(FramedRead::new(
            read_half,
            LinesCodec::new_with_max_length(MAX_LINE_LEN),
        ));
        *self.writer.lock().await = Some(FramedWrite::new(write_half, LinesCodec::new()));
        self.connected.store(true, Ordering::SeqCst);

        info!(address = %self.address, "connected");
        Ok(())
    }

    async fn disconnect(&self) {
        let was_connected = self.connected.swap(false, Ordering::SeqCst);

        // A server-side close clears `connected` without releasing the writer.
        let writer = self.writer.lock().await.take();
        if let Some(mut writer) = writer
            && let Err(e) = SinkExt::<String>::close(&mut writer).await
        {
            debug!(error = %e, "error closing writer");
        }

        if was_connected {
            self.shutdown.notify_waiters();
            info!(address = %self.address, "disconnected");
        }
    }

    async fn send_line(&self, line: &str) -> Result<(), TransportError> {
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(TransportError::Closed)?;
        // LinesCodec terminates with '\n' only.
        writer.send(format!("{line}\r")).await?;
        Ok(())
    }

    async fn read_line(&self) -> Result<Option<String>, TransportError> {
        let mut guard = self.reader.lock().await;

        // Registered before the connectivity check so a concurrent
        // disconnect cannot slip in between.
        let shutdown = self.shutdown.notified();
        tokio::pin!(shutdown);
        shutdown.as_mut().enable();

        if !self.is_connected() {
            return Ok(None);
        }
        let Some(reader) = guard.as_mut() else {
            return Ok(None);
        };

        let next = tokio::select! {
            next = reader.next() => next,
            _ = shutdown => None,
        };

        match next {
            Some(Ok(line)) => Ok(Some(line)),
            Some(Err(e)) => Err(e.into()),
            None => {
                self.connected.store(false, Ordering::SeqCst);
                guard.take();
                Ok(None)
            }
        }
    }

    async fn login(&self, username: &str, token: &str) -> Result<(), TransportError> {
        let token = if token.starts_with("oauth:") {
            token.to_string()
        } else {
            format!("oauth:{token}")
        };
        self.send_line(&format!("PASS {token}")).await?;
        self.send_line(&format!("NICK {}", username.to_lowercase()))
            .await?;
        debug!(username, "login sent");
        Ok(())
    }

    async fn join_channel(&self, channel: &str) -> Result<(), TransportError> {
        let channel = if channel.starts_with('#') {
            channel.to_lowercase()
        } else {
            format!("#{}", channel.to_lowercase())
        };
        self.send_line(&format!("JOIN {channel}")).await?;
        *self.channel.write() = channel;
        Ok(())
    }

    fn channel_name(&self) -> String {
        self.channel.read().clone()
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
