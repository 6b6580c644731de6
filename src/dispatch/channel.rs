//! Roster handlers: JOIN, PART, names reply and MODE.

use super::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};
use crate::line::RawLine;
use async_trait::async_trait;

/// Numeric reply carrying a names snapshot.
pub const RPL_NAMREPLY: &str = "353";

fn sender(line: &RawLine) -> Result<&str, HandlerError> {
    line.nick()
        .ok_or(HandlerError::Malformed("prefix without '!'"))
}

/// Handler for JOIN.
pub struct JoinHandler;

#[async_trait]
impl Handler for JoinHandler {
    async fn handle(&self, ctx: &mut Context<'_>, line: &RawLine) -> HandlerResult {
        let username = sender(line)?;
        ctx.membership.on_join(username, ctx.channel);
        Ok(())
    }
}

/// Handler for PART.
pub struct PartHandler;

#[async_trait]
impl Handler for PartHandler {
    async fn handle(&self, ctx: &mut Context<'_>, line: &RawLine) -> HandlerResult {
        let username = sender(line)?;
        ctx.membership.on_part(username);
        Ok(())
    }
}

/// Handler for the names reply.
pub struct NamesHandler;

#[async_trait]
impl Handler for NamesHandler {
    async fn handle(&self, ctx: &mut Context<'_>, line: &RawLine) -> HandlerResult {
        // 353 <me> <type> <channel> :<names>
        let names = line.arg(3).ok_or(HandlerError::NeedMoreParams)?;
        ctx.membership.on_names(names, ctx.channel);
        Ok(())
    }
}

/// Handler for MODE. Only operator grants are tracked.
pub struct ModeHandler;

#[async_trait]
impl Handler for ModeHandler {
    async fn handle(&self, ctx: &mut Context<'_>, line: &RawLine) -> HandlerResult {
        // MODE <channel> <mode> <target>
        let (Some(mode), Some(target)) = (line.arg(1), line.arg(2)) else {
            return Err(HandlerError::NeedMoreParams);
        };
        if mode == "+o" {
            ctx.membership.on_op(target, ctx.channel);
        }
        Ok(())
    }
}
