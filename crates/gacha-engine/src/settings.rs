//! Live engine settings, swapped atomically on config reload.

use std::sync::Arc;

use gacha_types::GachaConfig;
use tokio::sync::watch;

use crate::game::GameBotMatcher;
use crate::wishlist::WishlistMatcher;

/// One consistent snapshot of the engine configuration with its derived
/// matchers. Readers clone the `Arc` out of the watch channel, so a
/// reload never shows anyone a half-built wishlist.
#[derive(Debug, Default)]
pub struct FarmSettings {
    pub config: GachaConfig,
    pub wishlist: WishlistMatcher,
    pub game_bot: GameBotMatcher,
}

/// Receiver half handed to the engine components.
pub type SettingsRx = watch::Receiver<Arc<FarmSettings>>;

impl FarmSettings {
    /// Builds a snapshot from raw configuration, compiling the matchers.
    pub fn compile(config: GachaConfig) -> Self {
        let wishlist = WishlistMatcher::compile_or_empty(&config.wishlist);
        let game_bot = GameBotMatcher::compile(&config.game);
        Self {
            config,
            wishlist,
            game_bot,
        }
    }

    /// True when the channel is enabled for the game.
    pub fn channel_enabled(&self, channel_id: u64) -> bool {
        self.config.channels.contains(&channel_id)
    }
}

/// Creates the settings channel the engine watches for reloads.
pub fn channel(config: GachaConfig) -> (watch::Sender<Arc<FarmSettings>>, SettingsRx) {
    watch::channel(Arc::new(FarmSettings::compile(config)))
}
