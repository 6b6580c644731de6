//! openbot - chat bot core with paced outbound traffic.
//!
//! Outbound commands are queued without blocking and drained by a single
//! background pacer that keeps the bot under the server's sliding-window
//! message limit. Inbound lines are dispatched to built-in handlers that
//! track channel membership and the bot's own privilege, then offered to
//! plugins.

pub mod bot;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod line;
pub mod membership;
pub mod pacing;
pub mod plugin;
pub mod storage;
pub mod transport;
pub mod user;
pub mod window;

pub use bot::Bot;
pub use config::Config;
pub use error::{BotError, HandlerError, TransportError, WindowError};
pub use line::RawLine;
pub use plugin::{Plugin, PluginCatalog, PluginContext, PluginRegistry};
pub use storage::Storage;
pub use transport::{TcpTransport, Transport};
pub use user::ChatUser;
pub use window::ExpiringWindow;
