//! Handler context and core types.

use crate::error::HandlerResult;
use crate::line::RawLine;
use crate::membership::Membership;
use crate::pacing::RateLimiter;
use crate::transport::Transport;
use crate::user::ChatUser;
use async_trait::async_trait;

/// A chat message resolved by the PRIVMSG handler, forwarded to plugins.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub sender: ChatUser,
    pub text: String,
}

/// Handler context passed to each built-in handler.
pub struct Context<'a> {
    /// Bot identity and roster.
    pub membership: &'a Membership,
    /// Outbound limiter, retiered on privilege changes.
    pub limiter: &'a RateLimiter,
    /// Direct line to the server, bypassing the pending queue.
    pub transport: &'a dyn Transport,
    /// Channel name at the time the line was received.
    pub channel: &'a str,
    /// Set by the PRIVMSG handler when the line is a chat message.
    pub chat: Option<ChatMessage>,
}

/// Inbound command handler.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &mut Context<'_>, line: &RawLine) -> HandlerResult;
}
