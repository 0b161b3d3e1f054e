//! Gacha farm client for Discord
//!
//! Connects a self-managed account to the Discord gateway and runs the farm
//! engine over it: watching announcements from the configured game bot,
//! tracking per-channel claim state and claiming wished characters.

mod config;
mod convert;
mod discord;
mod handler;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use gacha_engine::{settings, Farm};
use gacha_gateway::SystemClock;
use serenity::model::gateway::GatewayIntents;
use serenity::prelude::*;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::discord::DiscordGateway;
use crate::handler::{FarmKey, Handler};

/// Gacha farm CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/gacha-bot.toml")]
    config: String,

    /// Discord token (overrides config file)
    #[arg(long, env = "DISCORD_BOT_TOKEN")]
    bot_token: Option<String>,

    /// Disable live reloading of the configuration file
    #[arg(long)]
    no_reload: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gacha_bot=debug,gacha_engine=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting gacha farm client");

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let config_exists = std::path::Path::new(&args.config).exists();
    let mut config = if config_exists {
        info!("Loading config from file: {}", args.config);
        Config::from_file(&args.config)?
    } else {
        info!("Config file not found, loading from environment");
        Config::from_env()?
    };
    if let Some(bot_token) = args.bot_token {
        config.discord.bot_token = bot_token;
    }

    // Warn about configuration that would leave the farm idle
    for w in config.gacha.warnings() {
        warn!("Config: {}", w);
    }

    let (settings_tx, settings_rx) = settings::channel(config.gacha.clone());

    // Keep pushing recompiled settings while the file changes underneath us.
    // The watcher is dropped, and reloading stops, when main returns.
    let _watcher = if config_exists && !args.no_reload {
        Some(config::spawn_config_reload(
            args.config.clone(),
            settings_tx,
        )?)
    } else {
        None
    };

    // Build serenity client
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord.bot_token, intents)
        .event_handler(Handler)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create Discord client: {}", e))?;

    // The engine logs claims against our own name, so resolve it up front.
    let current_user = client
        .http
        .get_current_user()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to look up the bot user: {}", e))?;
    let own_user = convert::chat_user(&current_user);
    info!("Running as {} ({})", own_user.name, own_user.id);

    // Build the farm over the live gateway
    let gateway = Arc::new(DiscordGateway::new(client.http.clone()));
    let farm = Arc::new(Farm::new(gateway, SystemClock, settings_rx, &own_user));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    farm.spawn_schedulers(shutdown_rx);

    // Insert the farm into client data for the event handler
    {
        let mut data = client.data.write().await;
        data.insert::<FarmKey>(farm);
    }

    // Graceful shutdown: close all shards on SIGTERM or Ctrl+C.
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = signal(SignalKind::terminate()).expect("SIGTERM handler");
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await.ok();
        }
        info!("Shutdown signal received, stopping Discord client...");
        let _ = shutdown_tx.send(true);
        shard_manager.shutdown_all().await;
    });

    info!("Starting Discord gateway connection...");

    // Start the Discord client (blocks until all shards are stopped)
    client
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Discord client error: {}", e))?;

    info!("Gacha farm client stopped");
    Ok(())
}
