//! Per-channel resource and cooldown model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::parser::{CooldownLine, StatusReport};

/// Everything known about one channel's game resources, inferred from
/// status reports and claim outcomes. `None` cooldowns mean "no known
/// cooldown", which reads as allowed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelState {
    pub claim_cooldown_until: Option<DateTime<Utc>>,
    pub rolls_remaining: u32,
    pub rolls_reset_at: Option<DateTime<Utc>>,
    pub kakera_cooldown_until: Option<DateTime<Utc>>,
    pub kakera_power: f64,
    pub kakera_consumption: f64,
    pub kakera_stock: u32,
    pub daily_reset_at: Option<DateTime<Utc>>,
    pub daily_available: bool,
    #[serde(skip)]
    pub last_refreshed_at: DateTime<Utc>,
    #[serde(skip)]
    pub force_next_refresh: bool,
}

fn apply_cooldown(target: &mut Option<DateTime<Utc>>, line: CooldownLine, now: DateTime<Utc>) {
    match line {
        CooldownLine::Absent => {}
        CooldownLine::Ready => *target = None,
        CooldownLine::ResetIn(wait) => *target = Some(now + wait),
    }
}

impl ChannelState {
    /// A fresh record knows nothing and forces its first refresh.
    pub fn new() -> Self {
        Self {
            claim_cooldown_until: None,
            rolls_remaining: 0,
            rolls_reset_at: None,
            kakera_cooldown_until: None,
            kakera_power: 0.0,
            kakera_consumption: 0.0,
            kakera_stock: 0,
            daily_reset_at: None,
            daily_available: false,
            last_refreshed_at: DateTime::UNIX_EPOCH,
            force_next_refresh: true,
        }
    }

    /// True when a normal claim is currently allowed.
    pub fn can_claim(&self, now: DateTime<Utc>) -> bool {
        self.claim_cooldown_until.map_or(true, |until| now >= until)
    }

    /// True when the power balance allows one more kakera claim.
    pub fn can_kakera(&self) -> bool {
        self.kakera_power - self.kakera_consumption >= 0.0
    }

    /// True when the kakera reaction cooldown has passed.
    pub fn kakera_ready(&self, now: DateTime<Utc>) -> bool {
        self.kakera_cooldown_until.map_or(true, |until| now >= until)
    }

    /// Burns the power one kakera claim costs.
    pub fn spend_kakera(&mut self) {
        self.kakera_power = (self.kakera_power - self.kakera_consumption).max(0.0);
    }

    /// The earliest time any tracked resource is expected to change.
    /// Resources that are already usable contribute nothing; `None` means
    /// no pending change is known.
    pub fn next_transition(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut earliest: Option<DateTime<Utc>> = None;
        let mut consider = |candidate: Option<DateTime<Utc>>| {
            if let Some(candidate) = candidate {
                earliest = Some(match earliest {
                    Some(current) if current <= candidate => current,
                    _ => candidate,
                });
            }
        };

        if !self.can_claim(now) {
            consider(self.claim_cooldown_until);
        }
        if self.rolls_remaining == 0 {
            consider(self.rolls_reset_at);
        }
        if !self.can_kakera() {
            consider(self.kakera_cooldown_until);
        }
        if !self.daily_available {
            consider(self.daily_reset_at);
        }
        earliest
    }

    /// Overwrites every field the report mentioned; fields whose line was
    /// absent keep their previous value.
    pub fn apply_report(&mut self, report: &StatusReport, now: DateTime<Utc>) {
        apply_cooldown(&mut self.claim_cooldown_until, report.claim, now);
        apply_cooldown(&mut self.rolls_reset_at, report.rolls_reset, now);
        apply_cooldown(&mut self.kakera_cooldown_until, report.kakera, now);

        if let Some(rolls) = report.rolls_left {
            self.rolls_remaining = rolls;
        }
        if let Some(power) = report.kakera_power {
            self.kakera_power = power;
        }
        if let Some(consumption) = report.kakera_consumption {
            self.kakera_consumption = consumption;
        }
        if let Some(stock) = report.kakera_stock {
            self.kakera_stock = stock;
        }

        match report.daily {
            CooldownLine::Absent => {}
            CooldownLine::Ready => {
                self.daily_available = true;
                self.daily_reset_at = None;
            }
            CooldownLine::ResetIn(wait) => {
                self.daily_available = false;
                self.daily_reset_at = Some(now + wait);
            }
        }

        self.last_refreshed_at = now;
    }
}

impl Default for ChannelState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::parser::parse_status_report;

    #[test]
    fn test_fresh_state_forces_refresh_and_allows_claims() {
        let now = Utc::now();
        let state = ChannelState::new();
        assert!(state.force_next_refresh);
        assert!(state.can_claim(now));
        assert!(state.kakera_ready(now));
        assert_eq!(state.last_refreshed_at, DateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_can_claim_respects_cooldown() {
        let now = Utc::now();
        let mut state = ChannelState::new();
        state.claim_cooldown_until = Some(now + Duration::minutes(10));
        assert!(!state.can_claim(now));
        assert!(state.can_claim(now + Duration::minutes(10)));
    }

    #[test]
    fn test_can_kakera_allows_exactly_balanced_power() {
        let mut state = ChannelState::new();
        state.kakera_power = 0.3;
        state.kakera_consumption = 0.3;
        assert!(state.can_kakera());

        state.kakera_power = 0.2;
        assert!(!state.can_kakera());
    }

    #[test]
    fn test_spend_kakera_saturates_at_zero() {
        let mut state = ChannelState::new();
        state.kakera_power = 0.5;
        state.kakera_consumption = 0.3;
        state.spend_kakera();
        assert!((state.kakera_power - 0.2).abs() < 1e-9);

        state.kakera_consumption = 0.9;
        state.spend_kakera();
        assert_eq!(state.kakera_power, 0.0);
    }

    #[test]
    fn test_next_transition_picks_earliest_blocked_resource() {
        let now = Utc::now();
        let mut state = ChannelState::new();
        state.claim_cooldown_until = Some(now + Duration::minutes(30));
        state.rolls_remaining = 0;
        state.rolls_reset_at = Some(now + Duration::minutes(10));
        state.daily_reset_at = Some(now + Duration::hours(20));

        assert_eq!(state.next_transition(now), Some(now + Duration::minutes(10)));
    }

    #[test]
    fn test_next_transition_skips_usable_resources() {
        let now = Utc::now();
        let mut state = ChannelState::new();
        // rolls remain, so the roll reset is not a pending transition
        state.rolls_remaining = 5;
        state.rolls_reset_at = Some(now + Duration::minutes(10));
        assert_eq!(state.next_transition(now), None);

        state.claim_cooldown_until = Some(now + Duration::minutes(30));
        assert_eq!(state.next_transition(now), Some(now + Duration::minutes(30)));
    }

    #[test]
    fn test_apply_report_overwrites_mentioned_fields_only() {
        let now = Utc::now();
        let mut state = ChannelState::new();
        state.kakera_stock = 5000;
        state.kakera_cooldown_until = Some(now + Duration::minutes(90));

        let report = parse_status_report(
            "**Self**, your claim reset is in **10** min.\nYou have **3** rolls left.",
            "Self",
            "$dk",
        )
        .unwrap();
        state.apply_report(&report, now);

        assert_eq!(state.claim_cooldown_until, Some(now + Duration::minutes(10)));
        assert_eq!(state.rolls_remaining, 3);
        // untouched by this report
        assert_eq!(state.kakera_stock, 5000);
        assert_eq!(state.kakera_cooldown_until, Some(now + Duration::minutes(90)));
        assert_eq!(state.last_refreshed_at, now);
    }

    #[test]
    fn test_apply_report_ready_lines_clear_cooldowns() {
        let now = Utc::now();
        let mut state = ChannelState::new();
        state.claim_cooldown_until = Some(now + Duration::minutes(90));
        state.daily_reset_at = Some(now + Duration::hours(3));

        let report = parse_status_report(
            "**Self**, you can claim right now! The next claim reset is in the future.\n$dk is ready!",
            "Self",
            "$dk",
        )
        .unwrap();
        state.apply_report(&report, now);

        assert_eq!(state.claim_cooldown_until, None);
        assert!(state.daily_available);
        assert_eq!(state.daily_reset_at, None);
    }

    #[test]
    fn test_serialized_state_omits_meta_fields() {
        let state = ChannelState::new();
        let json = serde_json::to_value(&state).unwrap();
        assert!(json.get("force_next_refresh").is_none());
        assert!(json.get("last_refreshed_at").is_none());
        assert!(json.get("rolls_remaining").is_some());
    }
}
