//! openbot - chat bot runner.
//!
//! Loads a TOML config, connects, logs in, joins the configured channel and
//! runs until interrupted.

use openbot::config::{self, Config, TOKEN_ENV_VAR};
use openbot::line::RawLine;
use openbot::{Bot, ChatUser, Plugin, PluginCatalog, PluginContext, PluginRegistry, TcpTransport};
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Logs every chat message at debug level.
struct ChatLog;

impl Plugin for ChatLog {
    fn handle_message(
        &self,
        ctx: &PluginContext<'_>,
        sender: &ChatUser,
        message: &str,
        _line: &RawLine,
        _handled: bool,
    ) -> bool {
        debug!(
            channel = ctx.channel,
            sender = sender.username(),
            moderator = sender.is_moderator(),
            message,
            "chat"
        );
        false
    }
}

fn chat_log() -> Arc<dyn Plugin> {
    Arc::new(ChatLog)
}

fn catalog() -> PluginCatalog {
    PluginCatalog::new().with("chat-log", chat_log)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "configuration has {} error(s), see above",
            errors.len()
        ));
    }

    let Some(token) = config.account.resolved_token() else {
        return Err(anyhow::anyhow!(
            "no OAuth token: set account.token or {TOKEN_ENV_VAR}"
        ));
    };

    info!(
        host = %config.connection.host,
        port = config.connection.port,
        username = %config.account.username,
        "Starting openbot"
    );

    let plugins = PluginRegistry::from_config(&config.plugins.enabled, &catalog())?;
    let transport = Arc::new(TcpTransport::new(
        &config.connection.host,
        config.connection.port,
    ));
    let username = config.account.username.clone();
    let channel = config.connection.channel.clone();
    let bot = Bot::new(config, transport);

    bot.connect().await?;
    bot.begin_listen()?;
    bot.login(&username, &token).await?;
    if let Some(channel) = channel {
        bot.join_channel(&channel).await?;
    }
    bot.initialize_plugins(plugins)?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    bot.disconnect().await;
    Ok(())
}
