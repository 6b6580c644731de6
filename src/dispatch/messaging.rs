//! Chat message and own-state handlers.

use super::{ChatMessage, Context, Handler};
use crate::error::{HandlerError, HandlerResult};
use crate::line::RawLine;
use async_trait::async_trait;
use tracing::trace;

/// Moderator flag carried in the `mod` tag.
fn moderator_tag(line: &RawLine) -> Result<bool, HandlerError> {
    line.tag("mod")
        .map(|value| value.starts_with('1'))
        .ok_or(HandlerError::Malformed("missing mod tag"))
}

/// Handler for PRIVMSG.
///
/// Records the sender's privilege and leaves the resolved message in the
/// context for plugin delivery.
pub struct PrivmsgHandler;

#[async_trait]
impl Handler for PrivmsgHandler {
    async fn handle(&self, ctx: &mut Context<'_>, line: &RawLine) -> HandlerResult {
        // @tags :nick!user@host PRIVMSG <channel> :<text>
        let username = line
            .nick()
            .ok_or(HandlerError::Malformed("prefix without '!'"))?;
        let text = line.arg(1).ok_or(HandlerError::NeedMoreParams)?;
        let moderator = moderator_tag(line)?;

        let from_self = ctx.membership.is_current(username);
        let sender = ctx.membership.on_message(username, moderator, ctx.channel);
        if from_self {
            ctx.limiter.set_elevated(moderator);
        }

        ctx.chat = Some(ChatMessage {
            sender,
            text: text.to_string(),
        });
        Ok(())
    }
}

/// Handler for USERSTATE: the bot's own privilege in the channel.
pub struct UserStateHandler;

#[async_trait]
impl Handler for UserStateHandler {
    async fn handle(&self, ctx: &mut Context<'_>, line: &RawLine) -> HandlerResult {
        let moderator = moderator_tag(line)?;
        if ctx.membership.set_current_moderator(moderator) {
            ctx.limiter.set_elevated(moderator);
        } else {
            trace!("USERSTATE before login ignored");
        }
        Ok(())
    }
}
