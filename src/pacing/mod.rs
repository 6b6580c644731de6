//! Outbound pacing.
//!
//! Outbound commands never go straight to the transport. Callers push them
//! onto a [`PendingQueue`] through an [`Outbox`]; a single
//! [`OutboundPacer`] task drains that queue no faster than the
//! [`RateLimiter`] allows.
//!
//! # Architecture
//!
//! ```text
//! callers ──► Outbox ──► PendingQueue ──► OutboundPacer ──► Transport
//!                                            │
//!                                            ▼
//!                                  RateLimiter (sliding ledger)
//! ```

mod limiter;
mod pacer;
mod queue;

pub use limiter::{RateLimiter, SentCommand};
pub use pacer::OutboundPacer;
pub use queue::{Outbox, PendingQueue};
