//! Claim correlation: pairs character announcements with the reactions
//! that appear on them and issues our own reaction at the right moment.

#[path = "claimer_tests.rs"]
mod claimer_tests;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use gacha_gateway::{Clock, Gateway};
use gacha_types::{CharacterInfo, ChatMessage, KakeraKind, ReactionEvent};
use tracing::{debug, info, warn};

use crate::emoji;
use crate::parser::{self, ClaimOutcome};
use crate::responses::ResponseRouter;
use crate::settings::{FarmSettings, SettingsRx};
use crate::tracker::StateTracker;

/// How a pending announcement may be claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimKind {
    /// Unowned character: hearts take it, kakera reactions take the orb.
    Normal,
    /// Already owned, only its kakera reactions are worth anything.
    CurrencyOnly,
}

#[derive(Debug, Clone)]
struct PendingClaim {
    channel_id: u64,
    character: CharacterInfo,
    kind: ClaimKind,
    created_at: DateTime<Utc>,
}

/// Watches announcements and reactions and claims wished characters.
pub struct Claimer<G, C> {
    gateway: Arc<G>,
    clock: C,
    tracker: Arc<StateTracker<G, C>>,
    router: Arc<ResponseRouter>,
    settings: SettingsRx,
    own_name: String,
    pending: Mutex<HashMap<u64, PendingClaim>>,
}

impl<G: Gateway, C: Clock> Claimer<G, C> {
    pub fn new(
        gateway: Arc<G>,
        clock: C,
        tracker: Arc<StateTracker<G, C>>,
        router: Arc<ResponseRouter>,
        settings: SettingsRx,
        own_name: String,
    ) -> Self {
        Self {
            gateway,
            clock,
            tracker,
            router,
            settings,
            own_name,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Inspects a message for a character announcement and, when it is one
    /// worth acting on, records it as pending until a claimable reaction
    /// shows up.
    pub async fn handle_announcement(&self, message: &ChatMessage) {
        let settings = self.settings.borrow().clone();
        if !settings.config.claim.enabled
            || !settings.game_bot.is_game_bot(&message.author)
            || !settings.channel_enabled(message.channel_id)
        {
            return;
        }

        self.purge_expired(settings.config.claim.pending_ttl_seconds);

        let Some(embed) = message.embeds.first() else {
            return;
        };
        let Some(name) = embed.author_name.as_deref() else {
            return;
        };
        let description = embed.description.as_deref().unwrap_or("");
        if is_list_report(description) {
            return;
        }

        let anime = description.lines().next().unwrap_or("");
        let character = CharacterInfo::new(name, anime);
        debug!(
            "Detected character '{}' in channel {}.",
            character, message.channel_id
        );

        let now = self.clock.now();
        let state = self.tracker.get(message.channel_id);

        let owned = embed
            .footer_text
            .as_deref()
            .is_some_and(|footer| footer.to_lowercase().starts_with("belongs"));

        let kind = if owned {
            if !state.kakera_ready(now) && !settings.config.claim.kakera_ignore_cooldown {
                return;
            }
            ClaimKind::CurrencyOnly
        } else {
            let content = message.content.to_lowercase();
            let wished = settings.wishlist.is_wished(&character)
                || (content.starts_with("wished by")
                    && settings.wishlist.is_wished_by(&message.mentions));
            if !wished {
                info!(
                    "Ignoring character '{}' in channel {} because they are not wished.",
                    character, message.channel_id
                );
                return;
            }
            if !state.can_claim(now) && !settings.config.claim.ignore_cooldown {
                let until = state.claim_cooldown_until.unwrap_or(now);
                warn!(
                    "Cannot claim character '{}' in channel {} because of cooldown. \
                     Cooldown finishes in {}min.",
                    character,
                    message.channel_id,
                    (until - now).num_minutes()
                );
                return;
            }
            info!(
                "Attempting to claim character '{}' in channel {}...",
                character, message.channel_id
            );
            ClaimKind::Normal
        };

        self.pending.lock().unwrap().insert(
            message.id,
            PendingClaim {
                channel_id: message.channel_id,
                character,
                kind,
                created_at: now,
            },
        );

        // reactions the platform already attached before we saw the message
        for emoji in &message.reactions {
            self.handle_reaction(&ReactionEvent {
                message_id: message.id,
                channel_id: message.channel_id,
                guild_id: message.guild_id,
                user_id: settings.config.game.user_id,
                emoji: emoji.clone(),
            })
            .await;
        }
    }

    /// Reacts to a reaction appearing on a pending announcement. The first
    /// claimable reaction consumes the pending entry.
    pub async fn handle_reaction(&self, reaction: &ReactionEvent) {
        let settings = self.settings.borrow().clone();
        if !settings.config.claim.enabled {
            return;
        }
        let Some(claim) = self.peek_pending(reaction.message_id) else {
            return;
        };

        if let Some(kind) = emoji::kakera_kind(&reaction.emoji) {
            if !kind.is_targeted(&settings.config.claim.kakera_targets) {
                info!(
                    "Ignoring {:?} kakera on character '{}' in channel {} because it is not targeted.",
                    kind, claim.character, claim.channel_id
                );
                return;
            }
            if kind.consumes_power() && !self.tracker.get(claim.channel_id).can_kakera() {
                debug!(
                    "Ignoring {:?} kakera on character '{}' in channel {}: not enough power.",
                    kind, claim.character, claim.channel_id
                );
                return;
            }
            let Some(claim) = self.take_pending(reaction.message_id) else {
                // another reaction won the race
                return;
            };
            self.issue_kakera_claim(&settings, &claim, reaction, kind).await;
        } else if claim.kind == ClaimKind::Normal
            && emoji::is_claim_emoji(&reaction.emoji, settings.config.claim.custom_emotes)
        {
            let Some(claim) = self.take_pending(reaction.message_id) else {
                return;
            };
            self.issue_claim(&settings, &claim, reaction).await;
        }
        // any other emoji leaves the pending entry alone
    }

    fn peek_pending(&self, message_id: u64) -> Option<PendingClaim> {
        self.pending.lock().unwrap().get(&message_id).cloned()
    }

    /// Atomic remove so two racing reactions cannot both claim.
    fn take_pending(&self, message_id: u64) -> Option<PendingClaim> {
        self.pending.lock().unwrap().remove(&message_id)
    }

    fn purge_expired(&self, ttl_seconds: u64) {
        let cutoff = self.clock.now() - Duration::seconds(ttl_seconds as i64);
        self.pending
            .lock()
            .unwrap()
            .retain(|_, claim| claim.created_at > cutoff);
    }

    async fn issue_claim(
        &self,
        settings: &FarmSettings,
        claim: &PendingClaim,
        reaction: &ReactionEvent,
    ) {
        self.clock.sleep(settings.config.claim.delay()).await;

        let ticket = self.router.register(claim.channel_id, |_| true);
        if let Err(e) = self
            .gateway
            .add_reaction(claim.channel_id, reaction.message_id, &reaction.emoji)
            .await
        {
            warn!(
                "Could not react to character '{}' in channel {}: {}",
                claim.character, claim.channel_id, e
            );
            return;
        }

        let outcome = ticket
            .wait(settings.config.claim.response_timeout())
            .await
            .map_or(ClaimOutcome::Unknown, |m| {
                parser::parse_claim_outcome(&m.content)
            });

        let now = self.clock.now();
        match outcome {
            ClaimOutcome::Succeeded { claimer } if claimer.eq_ignore_ascii_case(&self.own_name) => {
                let elapsed = (now - claim.created_at).num_milliseconds();
                info!(
                    "Claimed character '{}' in channel {} in {}ms.",
                    claim.character, claim.channel_id, elapsed
                );
            }
            ClaimOutcome::Succeeded { claimer } => {
                info!(
                    "Character '{}' in channel {} was claimed by '{}'.",
                    claim.character, claim.channel_id, claimer
                );
            }
            ClaimOutcome::Cooldown(wait) => {
                self.tracker.update(claim.channel_id, |state| {
                    state.claim_cooldown_until = Some(now + wait);
                });
                warn!(
                    "Could not claim character '{}' in channel {} because of cooldown. \
                     Cooldown finishes in {}min.",
                    claim.character,
                    claim.channel_id,
                    wait.num_minutes()
                );
            }
            ClaimOutcome::Unknown => {
                warn!(
                    "Probably claimed character '{}' in channel {}, but the result could not \
                     be determined. Channel is probably busy.",
                    claim.character, claim.channel_id
                );
            }
        }
    }

    async fn issue_kakera_claim(
        &self,
        settings: &FarmSettings,
        claim: &PendingClaim,
        reaction: &ReactionEvent,
        kind: KakeraKind,
    ) {
        self.clock.sleep(settings.config.claim.kakera_delay()).await;

        let ticket = self.router.register(claim.channel_id, |_| true);
        if let Err(e) = self
            .gateway
            .add_reaction(claim.channel_id, reaction.message_id, &reaction.emoji)
            .await
        {
            warn!(
                "Could not react to {:?} kakera in channel {}: {}",
                kind, claim.channel_id, e
            );
            return;
        }

        let outcome = ticket
            .wait(settings.config.claim.response_timeout())
            .await
            .map_or(ClaimOutcome::Unknown, |m| {
                parser::parse_kakera_outcome(&m.content)
            });

        let now = self.clock.now();
        match outcome {
            ClaimOutcome::Succeeded { claimer } if claimer.eq_ignore_ascii_case(&self.own_name) => {
                info!(
                    "Claimed {:?} kakera on character '{}' in channel {}.",
                    kind, claim.character, claim.channel_id
                );
                if kind.consumes_power() {
                    self.tracker
                        .update(claim.channel_id, |state| state.spend_kakera());
                }
            }
            ClaimOutcome::Succeeded { claimer } => {
                info!(
                    "{:?} kakera in channel {} was taken by '{}'.",
                    kind, claim.channel_id, claimer
                );
            }
            ClaimOutcome::Cooldown(wait) => {
                self.tracker.update(claim.channel_id, |state| {
                    state.kakera_cooldown_until = Some(now + wait);
                });
                warn!(
                    "Could not claim {:?} kakera in channel {} because of cooldown. \
                     Cooldown finishes in {}min.",
                    kind,
                    claim.channel_id,
                    wait.num_minutes()
                );
            }
            ClaimOutcome::Unknown => {
                warn!(
                    "Probably claimed {:?} kakera in channel {}, but the result could not \
                     be determined.",
                    kind, claim.channel_id
                );
            }
        }
    }
}

// $im pages and similar lookups carry claim/like rosters
fn is_list_report(description: &str) -> bool {
    description.lines().any(|line| {
        let line = line.trim().to_lowercase();
        line.starts_with("claims:") || line.starts_with("likes:")
    })
}
