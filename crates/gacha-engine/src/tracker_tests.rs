#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, Duration};
    use gacha_gateway::{MockClock, MockGateway};
    use gacha_types::{ChatMessage, ChatUser, GachaConfig};
    use tokio::sync::watch;

    use crate::responses::ResponseRouter;
    use crate::settings::{self, FarmSettings};
    use crate::tracker::StateTracker;

    const CHANNEL: u64 = 500;

    const REPORT: &str = "**Self**, your claim reset is in **2h 15** min.\n\
        You have **7** rolls left.\n\
        Next rolls reset in **45** min.\n\
        You can react to kakera right now!\n\
        Power of kakera: **54%** (consumes 30% per claim)\n\
        Stock of kakera: **1200**\n\
        $dk is ready!";

    fn config() -> GachaConfig {
        let mut config = GachaConfig::default();
        config.channels = vec![CHANNEL];
        config.game.user_id = 42;
        config
    }

    fn tracker(
        config: GachaConfig,
    ) -> (
        Arc<StateTracker<MockGateway, MockClock>>,
        Arc<MockGateway>,
        MockClock,
        Arc<ResponseRouter>,
        watch::Sender<Arc<FarmSettings>>,
    ) {
        let gateway = Arc::new(MockGateway::new());
        let clock = MockClock::new();
        let router = Arc::new(ResponseRouter::default());
        let (settings_tx, settings_rx) = settings::channel(config);
        let tracker = Arc::new(StateTracker::new(
            gateway.clone(),
            clock.clone(),
            router.clone(),
            settings_rx,
            "Self".to_string(),
        ));
        (tracker, gateway, clock, router, settings_tx)
    }

    fn bot_message(content: &str) -> ChatMessage {
        ChatMessage {
            id: 900,
            channel_id: CHANNEL,
            guild_id: None,
            author: ChatUser {
                id: 42,
                name: "Mudae".to_string(),
                bot: true,
            },
            content: content.to_string(),
            embeds: vec![],
            mentions: vec![],
            reactions: vec![],
        }
    }

    #[tokio::test]
    async fn test_refresh_applies_status_report() {
        let (tracker, gateway, clock, router, _tx) = tracker(config());
        let now = clock.current();

        let (state, _) = tokio::join!(tracker.refresh(CHANNEL), async {
            gateway.wait_for_calls(1).await;
            router.deliver(&bot_message(REPORT));
        });

        assert_eq!(
            gateway.sent_messages(),
            vec![(CHANNEL, "$tu".to_string())]
        );
        assert_eq!(state.claim_cooldown_until, Some(now + Duration::minutes(135)));
        assert_eq!(state.rolls_remaining, 7);
        assert_eq!(state.rolls_reset_at, Some(now + Duration::minutes(45)));
        assert!(state.kakera_ready(now));
        assert_eq!(state.kakera_power, 0.54);
        assert_eq!(state.kakera_consumption, 0.3);
        assert_eq!(state.kakera_stock, 1200);
        assert!(state.daily_available);
        assert!(!state.force_next_refresh);
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_share_one_request() {
        let (tracker, gateway, _clock, router, _tx) = tracker(config());

        let (a, b, _) = tokio::join!(
            tracker.refresh(CHANNEL),
            tracker.refresh(CHANNEL),
            async {
                gateway.wait_for_calls(1).await;
                router.deliver(&bot_message(REPORT));
            }
        );

        assert_eq!(gateway.sent_messages().len(), 1);
        assert_eq!(a, b);
        assert_eq!(a.rolls_remaining, 7);
    }

    #[tokio::test]
    async fn test_refresh_timeout_keeps_previous_state() {
        let mut config = config();
        config.status.refresh_timeout_seconds = 0.05;
        let (tracker, gateway, _clock, _router, _tx) = tracker(config);

        let state = tracker.refresh(CHANNEL).await;

        assert_eq!(gateway.sent_messages().len(), 1);
        assert!(state.force_next_refresh);
        assert_eq!(state.last_refreshed_at, DateTime::UNIX_EPOCH);
    }

    #[tokio::test]
    async fn test_get_creates_record_forcing_refresh() {
        let (tracker, _gateway, clock, _router, _tx) = tracker(config());

        let state = tracker.get(CHANNEL);

        assert!(state.force_next_refresh);
        assert!(state.can_claim(clock.current()));
        assert_eq!(state.rolls_remaining, 0);
    }

    #[tokio::test]
    async fn test_observe_records_roll_limit_notice() {
        let (tracker, _gateway, clock, _router, _tx) = tracker(config());
        let now = clock.current();

        tracker.observe(&bot_message(
            "The roulette is limited to 1h. **37** min. left",
        ));

        let state = tracker.get(CHANNEL);
        assert_eq!(state.rolls_remaining, 0);
        assert_eq!(state.rolls_reset_at, Some(now + Duration::minutes(37)));
    }

    #[tokio::test]
    async fn test_observe_ignores_disabled_channels() {
        let (tracker, _gateway, _clock, _router, _tx) = tracker(config());

        let mut message = bot_message("The roulette is limited to 1h. **37** min. left");
        message.channel_id = 999;
        tracker.observe(&message);

        assert!(tracker.channels.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_refreshes_forced_channels() {
        let (tracker, gateway, _clock, router, _tx) = tracker(config());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(tracker.clone().run(shutdown_rx));

        gateway.wait_for_calls(1).await;
        router.deliver(&bot_message(REPORT));
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(
            gateway.sent_messages(),
            vec![(CHANNEL, "$tu".to_string())]
        );
        assert!(!tracker.get(CHANNEL).force_next_refresh);
    }
}
