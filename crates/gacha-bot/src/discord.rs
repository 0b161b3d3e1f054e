//! Live gateway implementation over the serenity HTTP client.

use std::sync::Arc;

use gacha_gateway::{Error, Gateway, Result};
use gacha_types::Emoji;
use serenity::builder::CreateMessage;
use serenity::http::Http;
use serenity::model::id::{ChannelId, MessageId};

use crate::convert;

pub struct DiscordGateway {
    http: Arc<Http>,
}

impl DiscordGateway {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

impl Gateway for DiscordGateway {
    async fn send_message(&self, channel_id: u64, content: &str) -> Result<u64> {
        let message = ChannelId::new(channel_id)
            .send_message(&*self.http, CreateMessage::new().content(content))
            .await
            .map_err(|e| Error::Send(e.to_string()))?;
        Ok(message.id.get())
    }

    async fn add_reaction(&self, channel_id: u64, message_id: u64, emoji: &Emoji) -> Result<()> {
        self.http
            .create_reaction(
                ChannelId::new(channel_id),
                MessageId::new(message_id),
                &convert::reaction_type(emoji),
            )
            .await
            .map_err(|e| Error::React(e.to_string()))
    }

    async fn trigger_typing(&self, channel_id: u64) -> Result<()> {
        self.http
            .broadcast_typing(ChannelId::new(channel_id))
            .await
            .map_err(|e| Error::Typing(e.to_string()))
    }
}
