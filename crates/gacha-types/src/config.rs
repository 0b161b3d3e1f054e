//! Configuration sections consumed by the engine.
//!
//! Every section deserializes from an empty table to sensible defaults so
//! a minimal config file stays minimal.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::game::KakeraKind;

/// Identity of the game bot whose announcements are automated against.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameBotConfig {
    /// User id of the primary game bot account.
    pub user_id: u64,
    /// Regex matched against usernames of secondary helper instances.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helper_name_pattern: Option<String>,
}

/// Claim behaviour. Delays and timeouts are in seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClaimConfig {
    pub enabled: bool,
    /// Artificial wait between deciding to claim and sending the reaction.
    pub delay_seconds: f64,
    pub kakera_delay_seconds: f64,
    /// How long to wait for the game bot's reply after claiming.
    pub response_timeout_seconds: f64,
    /// Pending claims older than this are dropped unclaimed.
    pub pending_ttl_seconds: u64,
    /// Currency kinds worth claiming.
    pub kakera_targets: HashSet<KakeraKind>,
    /// Count every emote as a claim reaction, not just the heart set.
    pub custom_emotes: bool,
    pub ignore_cooldown: bool,
    pub kakera_ignore_cooldown: bool,
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_seconds: 0.2,
            kakera_delay_seconds: 0.2,
            response_timeout_seconds: 2.0,
            pending_ttl_seconds: 60,
            kakera_targets: KakeraKind::ALL.into_iter().collect(),
            custom_emotes: false,
            ignore_cooldown: false,
            kakera_ignore_cooldown: false,
        }
    }
}

impl ClaimConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay_seconds.max(0.0))
    }

    pub fn kakera_delay(&self) -> Duration {
        Duration::from_secs_f64(self.kakera_delay_seconds.max(0.0))
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.response_timeout_seconds.max(0.0))
    }
}

/// Status-report refreshing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StatusConfig {
    /// Command that asks the game bot for a status report.
    pub command: String,
    /// How long to wait for the report before giving up.
    pub refresh_timeout_seconds: f64,
    /// Minimum spacing between refresh attempts for one channel.
    pub min_refresh_interval_seconds: u64,
    /// State older than this is refreshed even with nothing due.
    pub max_state_age_hours: i64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            command: "$tu".to_string(),
            refresh_timeout_seconds: 5.0,
            min_refresh_interval_seconds: 30,
            max_state_age_hours: 12,
        }
    }
}

impl StatusConfig {
    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.refresh_timeout_seconds.max(0.0))
    }
}

/// Automatic rolling and daily collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RollConfig {
    pub enabled: bool,
    /// Roll command to send, e.g. `$w`.
    pub command: String,
    /// Fixed spacing between rolls. Unset derives the spacing from the
    /// remaining roll budget and its reset time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_minutes: Option<f64>,
    /// Typing-indicator wait before each sent command.
    pub typing_delay_seconds: f64,
    /// Keep rolling while the claim cooldown is active.
    pub roll_with_no_claim: bool,
    pub daily_enabled: bool,
    /// Daily bonus command, also the token looked for in status reports.
    pub daily_command: String,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: "$w".to_string(),
            interval_minutes: None,
            typing_delay_seconds: 0.3,
            roll_with_no_claim: false,
            daily_enabled: false,
            daily_command: "$dk".to_string(),
        }
    }
}

impl RollConfig {
    pub fn typing_delay(&self) -> Duration {
        Duration::from_secs_f64(self.typing_delay_seconds.max(0.0))
    }
}

/// Character and anime patterns worth claiming. Entries are globs:
/// `*` matches any run of characters, `?` a single one, the rest is
/// literal, all case-insensitive.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WishlistConfig {
    pub characters: Vec<String>,
    pub animes: Vec<AnimeWish>,
    /// Users whose "wished by" mentions are trusted.
    pub wished_by: Vec<u64>,
}

/// One anime entry with optional character exclusions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnimeWish {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluding: Vec<String>,
}

/// Everything the engine needs to run against one game bot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GachaConfig {
    /// Channels enabled for the game.
    pub channels: Vec<u64>,
    pub game: GameBotConfig,
    pub claim: ClaimConfig,
    pub status: StatusConfig,
    pub roll: RollConfig,
    pub wishlist: WishlistConfig,
}

impl GachaConfig {
    /// Flags configuration that is probably a mistake.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.game.user_id == 0 {
            warnings.push("game.user_id is not set; no announcements will match".to_string());
        }
        if self.channels.is_empty() {
            warnings.push("channels is empty; nothing is enabled".to_string());
        }
        if self.claim.enabled
            && self.wishlist.characters.is_empty()
            && self.wishlist.animes.is_empty()
            && self.wishlist.wished_by.is_empty()
        {
            warnings.push("claiming is enabled but the wishlist is empty".to_string());
        }
        warnings
    }
}
