//! Game bot identification.

use gacha_types::{ChatUser, GameBotConfig};
use regex::Regex;
use tracing::warn;

/// Matches chat users against the configured game bot identity.
///
/// The game runs as one primary bot account plus optional secondary
/// helper instances, recognized by a username pattern.
#[derive(Debug, Default)]
pub struct GameBotMatcher {
    user_id: u64,
    helper_names: Option<Regex>,
}

impl GameBotMatcher {
    pub fn compile(config: &GameBotConfig) -> Self {
        let helper_names = config
            .helper_name_pattern
            .as_deref()
            .and_then(|pattern| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Invalid game.helper_name_pattern, ignoring it: {}", e);
                    None
                }
            });

        Self {
            user_id: config.user_id,
            helper_names,
        }
    }

    /// True when the user is the game bot or one of its helper instances.
    pub fn is_game_bot(&self, user: &ChatUser) -> bool {
        user.bot
            && (self.user_id != 0 && user.id == self.user_id
                || self
                    .helper_names
                    .as_ref()
                    .map_or(false, |re| re.is_match(&user.name)))
    }
}
