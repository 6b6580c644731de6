//! Transport boundary.
//!
//! The core never touches sockets directly. A [`Transport`] owns the
//! connection, line framing and login handshake; the bot only asks it to
//! send a line, read the next line, and report whether it is still
//! connected. [`TcpTransport`] is a plain line-oriented implementation.

mod tcp;

pub use tcp::TcpTransport;

use crate::error::TransportError;
use async_trait::async_trait;

/// Maximum accepted line length, including tags.
pub const MAX_LINE_LEN: usize = 8191;

/// Connection to a chat server.
///
/// `read_line` is only ever called from one task at a time (the bot's
/// listener); the other methods may be called concurrently.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Establish the connection.
    async fn connect(&self) -> Result<(), TransportError>;

    /// Close the connection. Idempotent.
    async fn disconnect(&self);

    /// Send one raw protocol line (without terminator).
    async fn send_line(&self, line: &str) -> Result<(), TransportError>;

    /// Next inbound line, or `Ok(None)` once the connection is closed.
    async fn read_line(&self) -> Result<Option<String>, TransportError>;

    /// Authenticate as `username`.
    async fn login(&self, username: &str, token: &str) -> Result<(), TransportError>;

    /// Join `channel` and remember it as the current channel.
    async fn join_channel(&self, channel: &str) -> Result<(), TransportError>;

    /// Current channel name (with leading `#`), empty before any join.
    fn channel_name(&self) -> String;

    fn is_connected(&self) -> bool;

    /// Raw command that posts `text` to the current channel.
    fn message_command(&self, text: &str) -> String {
        format!("PRIVMSG {} :{}", self.channel_name(), text)
    }
}
