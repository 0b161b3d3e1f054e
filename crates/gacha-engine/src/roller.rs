//! Automatic rolling and daily bonus collection.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use gacha_gateway::{Clock, Gateway};
use gacha_types::RollConfig;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::settings::{FarmSettings, SettingsRx};
use crate::state::ChannelState;
use crate::tracker::StateTracker;

/// Spends the roll budget on a schedule derived from the tracked state and
/// collects the daily bonus when it comes up.
pub struct Roller<G, C> {
    gateway: Arc<G>,
    clock: C,
    tracker: Arc<StateTracker<G, C>>,
    settings: SettingsRx,
    next_roll_at: Mutex<HashMap<u64, DateTime<Utc>>>,
}

impl<G: Gateway, C: Clock> Roller<G, C> {
    pub fn new(
        gateway: Arc<G>,
        clock: C,
        tracker: Arc<StateTracker<G, C>>,
        settings: SettingsRx,
    ) -> Self {
        Self {
            gateway,
            clock,
            tracker,
            settings,
            next_roll_at: Mutex::new(HashMap::new()),
        }
    }

    /// Periodic scheduler for rolls and dailies. Runs until `shutdown`
    /// flips.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut tick = tokio::time::interval(std::time::Duration::from_secs(1));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = tick.tick() => {}
                _ = shutdown.changed() => break,
            }

            let settings = self.settings.borrow().clone();
            for &channel_id in &settings.config.channels {
                self.try_daily(&settings, channel_id).await;
                self.try_roll(&settings, channel_id).await;
            }
        }
    }

    async fn try_daily(&self, settings: &FarmSettings, channel_id: u64) {
        if !settings.config.roll.daily_enabled {
            return;
        }
        if !self.tracker.get(channel_id).daily_available {
            return;
        }

        info!("Collecting the daily bonus in channel {}.", channel_id);
        self.send_with_typing(settings, channel_id, &settings.config.roll.daily_command)
            .await;
        self.tracker.update(channel_id, |state| {
            state.daily_available = false;
            // pick the real reset time up from the next report
            state.force_next_refresh = true;
        });
    }

    async fn try_roll(&self, settings: &FarmSettings, channel_id: u64) {
        if !settings.config.roll.enabled {
            return;
        }
        let now = self.clock.now();
        if self
            .next_roll_at
            .lock()
            .unwrap()
            .get(&channel_id)
            .is_some_and(|&at| now < at)
        {
            return;
        }

        let state = self.tracker.get(channel_id);
        if state.rolls_remaining == 0 {
            return;
        }
        if !state.can_claim(now) && !settings.config.roll.roll_with_no_claim {
            return;
        }

        let spacing = roll_spacing(&settings.config.roll, &state, now);
        self.next_roll_at
            .lock()
            .unwrap()
            .insert(channel_id, now + spacing);

        debug!(
            "Rolling in channel {}, {} rolls left, next roll in {}s.",
            channel_id,
            state.rolls_remaining,
            spacing.num_seconds()
        );
        self.send_with_typing(settings, channel_id, &settings.config.roll.command)
            .await;
        self.tracker.update(channel_id, |state| {
            state.rolls_remaining = state.rolls_remaining.saturating_sub(1);
        });
    }

    async fn send_with_typing(&self, settings: &FarmSettings, channel_id: u64, command: &str) {
        if let Err(e) = self.gateway.trigger_typing(channel_id).await {
            debug!("Could not trigger typing in channel {}: {}", channel_id, e);
        }
        self.clock.sleep(settings.config.roll.typing_delay()).await;

        if let Err(e) = self.gateway.send_message(channel_id, command).await {
            warn!("Could not send '{}' in channel {}: {}", command, channel_id, e);
        }
    }
}

/// Spacing until the next roll: the configured fixed interval, or the
/// remaining budget spread evenly until it resets, floored at 5s.
fn roll_spacing(roll: &RollConfig, state: &ChannelState, now: DateTime<Utc>) -> Duration {
    let spacing = match roll.interval_minutes {
        Some(minutes) => Duration::seconds((minutes * 60.0) as i64),
        None => match state.rolls_reset_at {
            Some(reset_at) if reset_at > now => (reset_at - now) / state.rolls_remaining as i32,
            _ => Duration::minutes(1),
        },
    };
    spacing.max(Duration::seconds(5))
}
