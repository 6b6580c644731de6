//! Unified error handling for openbot.
//!
//! This module provides the error hierarchy for the bot core: session-level
//! failures surfaced to callers, transport failures passed through from the
//! connection layer, and the locally-recovered handler errors produced by
//! malformed inbound lines.

use thiserror::Error;

// ============================================================================
// Bot Errors (public session surface)
// ============================================================================

/// Errors returned by [`crate::Bot`] operations.
#[derive(Debug, Error)]
pub enum BotError {
    /// The operation requires an established connection.
    #[error("connection required: {0}")]
    NotConnected(&'static str),

    #[error("unable to connect: {0}")]
    ConnectFailed(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The operation exists on the surface but is deliberately not supported.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error("unknown plugin: {0}")]
    UnknownPlugin(String),

    #[error("plugin already registered: {0}")]
    DuplicatePlugin(String),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl BotError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotConnected(_) => "not_connected",
            Self::ConnectFailed(_) => "connect_failed",
            Self::Transport(_) => "transport",
            Self::Unsupported(_) => "unsupported",
            Self::UnknownPlugin(_) => "unknown_plugin",
            Self::DuplicatePlugin(_) => "duplicate_plugin",
            Self::Storage(_) => "storage",
            Self::Database(_) => "database",
        }
    }
}

// ============================================================================
// Transport Errors (connection layer)
// ============================================================================

/// Errors raised by a [`crate::transport::Transport`] implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line codec error: {0}")]
    Codec(#[from] tokio_util::codec::LinesCodecError),

    #[error("transport is not connected")]
    Closed,
}

// ============================================================================
// Handler Errors (inbound dispatch)
// ============================================================================

/// Errors produced by built-in inbound handlers.
///
/// Malformed variants are recovered by the dispatcher (the line is dropped);
/// only `Transport` is propagated.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("not enough parameters")]
    NeedMoreParams,

    #[error("malformed line: {0}")]
    Malformed(&'static str),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result type for inbound handlers.
pub type HandlerResult = Result<(), HandlerError>;

// ============================================================================
// Window Errors
// ============================================================================

/// Errors from positional access to an [`crate::window::ExpiringWindow`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("index {index} out of range for window of {len} live entries")]
    IndexOutOfRange { index: usize, len: usize },
}
