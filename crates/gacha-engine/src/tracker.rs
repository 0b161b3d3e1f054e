//! Per-channel state tracking with single-flight refreshes.

#[path = "tracker_tests.rs"]
mod tracker_tests;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use gacha_gateway::{Clock, Gateway};
use gacha_types::ChatMessage;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::parser;
use crate::responses::ResponseRouter;
use crate::settings::SettingsRx;
use crate::state::ChannelState;

struct ChannelEntry {
    state: Mutex<ChannelState>,
    // single-flight marker: whoever holds this performs the refresh
    refresh_gate: tokio::sync::Mutex<()>,
    last_attempt_at: Mutex<DateTime<Utc>>,
}

impl ChannelEntry {
    fn new() -> Self {
        Self {
            state: Mutex::new(ChannelState::new()),
            refresh_gate: tokio::sync::Mutex::new(()),
            last_attempt_at: Mutex::new(DateTime::UNIX_EPOCH),
        }
    }
}

/// Tracks one [`ChannelState`] per channel and keeps it fresh by sending
/// the status command and parsing the game bot's report.
pub struct StateTracker<G, C> {
    gateway: Arc<G>,
    clock: C,
    router: Arc<ResponseRouter>,
    settings: SettingsRx,
    own_name: String,
    channels: Mutex<HashMap<u64, Arc<ChannelEntry>>>,
}

impl<G: Gateway, C: Clock> StateTracker<G, C> {
    pub fn new(
        gateway: Arc<G>,
        clock: C,
        router: Arc<ResponseRouter>,
        settings: SettingsRx,
        own_name: String,
    ) -> Self {
        Self {
            gateway,
            clock,
            router,
            settings,
            own_name,
            channels: Mutex::new(HashMap::new()),
        }
    }

    fn entry(&self, channel_id: u64) -> Arc<ChannelEntry> {
        self.channels
            .lock()
            .unwrap()
            .entry(channel_id)
            .or_insert_with(|| Arc::new(ChannelEntry::new()))
            .clone()
    }

    /// Returns the current state for a channel, creating a fresh record
    /// (which forces a refresh) on first access.
    pub fn get(&self, channel_id: u64) -> ChannelState {
        self.entry(channel_id).state.lock().unwrap().clone()
    }

    /// Applies a mutation to a channel's state under its lock.
    pub fn update<F>(&self, channel_id: u64, apply: F)
    where
        F: FnOnce(&mut ChannelState),
    {
        let entry = self.entry(channel_id);
        let mut state = entry.state.lock().unwrap();
        apply(&mut state);
    }

    /// Feeds a game-bot message through the passive observers. Currently
    /// only the out-of-rolls notice is watched for.
    pub fn observe(&self, message: &ChatMessage) {
        let settings = self.settings.borrow().clone();
        if !settings.channel_enabled(message.channel_id) {
            return;
        }

        if let Some(reset_in) = parser::parse_roll_limited(&message.content) {
            let now = self.clock.now();
            self.update(message.channel_id, |state| {
                state.rolls_remaining = 0;
                state.rolls_reset_at = Some(now + reset_in);
            });
            info!(
                "Channel {} is out of rolls, resets in {}min.",
                message.channel_id,
                reset_in.num_minutes()
            );
        }
    }

    /// Refreshes a channel's state from a fresh status report and returns
    /// the result.
    ///
    /// Concurrent calls for the same channel share a single request: late
    /// callers wait for the in-flight refresh instead of issuing another
    /// command, then read whatever it produced.
    pub async fn refresh(&self, channel_id: u64) -> ChannelState {
        let entry = self.entry(channel_id);
        match entry.refresh_gate.try_lock() {
            Ok(_guard) => self.refresh_locked(channel_id, &entry).await,
            // refresh in flight; wait for it to finish and reuse its result
            Err(_) => drop(entry.refresh_gate.lock().await),
        }
        let state = entry.state.lock().unwrap().clone();
        state
    }

    async fn refresh_locked(&self, channel_id: u64, entry: &ChannelEntry) {
        let settings = self.settings.borrow().clone();
        *entry.last_attempt_at.lock().unwrap() = self.clock.now();

        let own_name = self.own_name.clone();
        let daily_token = settings.config.roll.daily_command.clone();
        let ticket = self.router.register(channel_id, move |message| {
            parser::parse_status_report(&message.content, &own_name, &daily_token).is_some()
        });

        if let Err(e) = self
            .gateway
            .send_message(channel_id, &settings.config.status.command)
            .await
        {
            warn!("Could not send status command in channel {}: {}", channel_id, e);
            return;
        }

        let Some(response) = ticket.wait(settings.config.status.refresh_timeout()).await else {
            warn!(
                "Expected a status report in channel {} but received nothing.",
                channel_id
            );
            return;
        };

        let Some(report) = parser::parse_status_report(
            &response.content,
            &self.own_name,
            &settings.config.roll.daily_command,
        ) else {
            return;
        };

        let now = self.clock.now();
        let mut state = entry.state.lock().unwrap();
        state.apply_report(&report, now);
        state.force_next_refresh = false;
        if let Ok(json) = serde_json::to_string(&*state) {
            debug!("Channel {} state updated: {}", channel_id, json);
        }
    }

    /// Periodic scheduler: refreshes an enabled channel when a tracked
    /// resource transition has passed, the record has aged out, or a
    /// refresh was forced. Runs until `shutdown` flips.
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
                let now = self.clock.now();
                let entry = self.entry(channel_id);

                let (due_at, forced) = {
                    let state = entry.state.lock().unwrap();
                    let mut due_at = state.last_refreshed_at
                        + Duration::hours(settings.config.status.max_state_age_hours);
                    if let Some(transition) = state.next_transition(now) {
                        due_at = due_at.min(transition);
                    }
                    (due_at, state.force_next_refresh)
                };

                if !forced && now < due_at {
                    continue;
                }

                // spacing cap so a channel that keeps failing to answer is
                // not hammered every tick
                let min_interval =
                    Duration::seconds(settings.config.status.min_refresh_interval_seconds as i64);
                if now < *entry.last_attempt_at.lock().unwrap() + min_interval {
                    continue;
                }

                self.refresh(channel_id).await;
            }
        }
    }
}
