//! Configuration management for gacha-bot

#[path = "config_tests.rs"]
mod config_tests;

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use gacha_engine::FarmSettings;
use gacha_types::GachaConfig;
use notify::{RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

/// Complete bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub discord: DiscordBotConfig,
    /// Engine settings live at the top level of the file.
    #[serde(flatten)]
    pub gacha: GachaConfig,
}

/// Discord connection specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordBotConfig {
    /// Token of the account running the farm.
    #[serde(default)]
    pub bot_token: String,
}

/// Environment lookup seam so env-driven loading stays testable.
pub trait ReadEnv {
    fn var(&self, key: &str) -> Option<String>;
}

struct ProcessEnv;

impl ReadEnv for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_env_impl(&ProcessEnv)
    }

    pub fn from_env_impl(env: &dyn ReadEnv) -> Result<Self> {
        let bot_token = env
            .var("DISCORD_BOT_TOKEN")
            .context("DISCORD_BOT_TOKEN not set")?;

        let mut gacha = GachaConfig::default();
        gacha.channels = parse_id_list(&env.var("GACHA_CHANNELS").unwrap_or_default());
        if let Some(id) = env.var("GACHA_GAME_USER_ID") {
            gacha.game.user_id = id
                .trim()
                .parse()
                .context("GACHA_GAME_USER_ID is not a user id")?;
        }
        gacha.wishlist.characters =
            parse_name_list(&env.var("GACHA_WISHED_CHARACTERS").unwrap_or_default());

        Ok(Config {
            discord: DiscordBotConfig { bot_token },
            gacha,
        })
    }
}

fn parse_id_list(s: &str) -> Vec<u64> {
    s.split(',')
        .map(|x| x.trim())
        .filter(|x| !x.is_empty())
        .filter_map(|x| x.parse::<u64>().ok())
        .collect()
}

fn parse_name_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim())
        .filter(|x| !x.is_empty())
        .map(|x| x.to_string())
        .collect()
}

/// Watches the config file and pushes recompiled settings into the engine.
///
/// The returned watcher must be kept alive for events to keep flowing.
pub fn spawn_config_reload(
    path: String,
    settings_tx: watch::Sender<Arc<FarmSettings>>,
) -> Result<notify::RecommendedWatcher> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
        if let Ok(event) = event {
            if event.kind.is_modify() || event.kind.is_create() {
                let _ = event_tx.send(());
            }
        }
    })
    .context("Failed to create config file watcher")?;

    watcher
        .watch(Path::new(&path), RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch config file: {}", path))?;

    tokio::spawn(async move {
        while event_rx.recv().await.is_some() {
            // editors fire bursts of events per save
            tokio::time::sleep(Duration::from_millis(200)).await;
            while event_rx.try_recv().is_ok() {}

            match Config::from_file(&path) {
                Ok(config) => {
                    for warning in config.gacha.warnings() {
                        warn!("Config: {}", warning);
                    }
                    settings_tx.send_replace(Arc::new(FarmSettings::compile(config.gacha)));
                    info!("Reloaded configuration from {}", path);
                }
                Err(e) => warn!("Could not reload {}: {}", path, e),
            }
        }
    });

    Ok(watcher)
}
