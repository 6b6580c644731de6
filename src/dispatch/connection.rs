//! Keep-alive handler.

use super::{Context, Handler};
use crate::error::HandlerResult;
use crate::line::RawLine;
use async_trait::async_trait;

/// Handler for PING.
///
/// The reply goes straight to the transport so it is never paced or queued
/// behind user traffic.
pub struct PingHandler;

#[async_trait]
impl Handler for PingHandler {
    async fn handle(&self, ctx: &mut Context<'_>, line: &RawLine) -> HandlerResult {
        // PING :<token>
        let token = line.arg(0).unwrap_or("");
        ctx.transport.send_line(&format!("PONG :{token}")).await?;
        Ok(())
    }
}
