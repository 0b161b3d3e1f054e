//! Serenity event handler implementation

use std::sync::Arc;

use gacha_engine::Farm;
use gacha_gateway::SystemClock;
use serenity::async_trait;
use serenity::model::channel::{Message, Reaction};
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::{error, info};

use crate::convert;
use crate::discord::DiscordGateway;

/// Context-data key for the farm shared between event callbacks.
pub struct FarmKey;

impl TypeMapKey for FarmKey {
    type Value = Arc<Farm<DiscordGateway, SystemClock>>;
}

pub struct Handler;

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            "Connected as {}#{:04}",
            ready.user.name,
            ready.user.discriminator.map_or(0, |d| d.get())
        );
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let farm = {
            let data = ctx.data.read().await;
            match data.get::<FarmKey>() {
                Some(f) => f.clone(),
                None => {
                    error!("Farm not found in context data");
                    return;
                }
            }
        };

        farm.on_message(&convert::chat_message(&msg)).await;
    }

    async fn reaction_add(&self, ctx: Context, add_reaction: Reaction) {
        let farm = {
            let data = ctx.data.read().await;
            match data.get::<FarmKey>() {
                Some(f) => f.clone(),
                None => return,
            }
        };

        farm.on_reaction(&convert::reaction_event(&add_reaction)).await;
    }
}
