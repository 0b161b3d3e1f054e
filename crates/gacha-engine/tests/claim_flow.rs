//! End-to-end claim flows through the public engine surface.

use std::sync::Arc;

use chrono::Duration;
use gacha_engine::settings;
use gacha_engine::{Farm, FarmSettings};
use gacha_gateway::{MockClock, MockGateway};
use gacha_types::{ChatMessage, ChatUser, Emoji, GachaConfig, MessageEmbed, ReactionEvent};
use tokio::sync::watch;

const CHANNEL: u64 = 500;
const GAME_BOT: u64 = 42;

fn config() -> GachaConfig {
    let mut config = GachaConfig::default();
    config.channels = vec![CHANNEL];
    config.game.user_id = GAME_BOT;
    config.wishlist.characters = vec!["rem".to_string()];
    config
}

fn farm() -> (
    Farm<MockGateway, MockClock>,
    Arc<MockGateway>,
    MockClock,
    watch::Sender<Arc<FarmSettings>>,
) {
    let gateway = Arc::new(MockGateway::new());
    let clock = MockClock::new();
    let (settings_tx, settings_rx) = settings::channel(config());
    let own_user = ChatUser {
        id: 1,
        name: "Self".to_string(),
        bot: false,
    };
    let farm = Farm::new(gateway.clone(), clock.clone(), settings_rx, &own_user);
    (farm, gateway, clock, settings_tx)
}

fn game_bot() -> ChatUser {
    ChatUser {
        id: GAME_BOT,
        name: "Mudae".to_string(),
        bot: true,
    }
}

fn announcement(id: u64, name: &str, anime: &str) -> ChatMessage {
    ChatMessage {
        id,
        channel_id: CHANNEL,
        guild_id: None,
        author: game_bot(),
        content: String::new(),
        embeds: vec![MessageEmbed {
            title: None,
            author_name: Some(name.to_string()),
            description: Some(format!("{}\nReact with any emoji to claim!", anime)),
            footer_text: None,
        }],
        mentions: vec![],
        reactions: vec![],
    }
}

fn reply(content: &str) -> ChatMessage {
    ChatMessage {
        id: 999,
        channel_id: CHANNEL,
        guild_id: None,
        author: game_bot(),
        content: content.to_string(),
        embeds: vec![],
        mentions: vec![],
        reactions: vec![],
    }
}

fn heart(message_id: u64) -> ReactionEvent {
    ReactionEvent {
        message_id,
        channel_id: CHANNEL,
        guild_id: None,
        user_id: GAME_BOT,
        emoji: Emoji::unicode("\u{1f496}"),
    }
}

#[tokio::test]
async fn test_wished_character_claim_round_trip() {
    let (farm, gateway, clock, _tx) = farm();

    farm.on_message(&announcement(100, "Rem", "Re:Zero")).await;
    let reaction = heart(100);
    tokio::join!(farm.on_reaction(&reaction), async {
        gateway.wait_for_calls(1).await;
        farm.on_message(&reply("\u{1f496} **Self** and **Rem** are now married!"))
            .await;
    });

    assert_eq!(
        gateway.reactions(),
        vec![(100, Emoji::unicode("\u{1f496}"))]
    );
    // a successful claim leaves the tracked cooldown untouched
    assert!(farm.tracker().get(CHANNEL).can_claim(clock.current()));
}

#[tokio::test]
async fn test_cooldown_reply_feeds_back_into_state() {
    let (farm, gateway, clock, _tx) = farm();
    let now = clock.current();

    farm.on_message(&announcement(100, "Rem", "Re:Zero")).await;
    let reaction = heart(100);
    tokio::join!(farm.on_reaction(&reaction), async {
        gateway.wait_for_calls(1).await;
        farm.on_message(&reply("Cooldown: 12min")).await;
    });

    assert_eq!(
        farm.tracker().get(CHANNEL).claim_cooldown_until,
        Some(now + Duration::minutes(12))
    );

    // the next announcement is skipped while the cooldown runs
    farm.on_message(&announcement(101, "Rem", "Re:Zero")).await;
    farm.on_reaction(&heart(101)).await;
    assert_eq!(gateway.reactions().len(), 1);
}

#[tokio::test]
async fn test_roll_limit_notice_zeroes_budget() {
    let (farm, _gateway, clock, _tx) = farm();

    farm.on_message(&reply("The roulette is limited to 1h. **37** min. left"))
        .await;

    let state = farm.tracker().get(CHANNEL);
    assert_eq!(state.rolls_remaining, 0);
    assert_eq!(
        state.rolls_reset_at,
        Some(clock.current() + Duration::minutes(37))
    );
}
