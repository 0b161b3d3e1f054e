//! Conversions between serenity models and the engine's chat values.

#[path = "convert_tests.rs"]
mod convert_tests;

use gacha_types::{ChatMessage, ChatUser, Emoji, MessageEmbed, ReactionEvent};
use serenity::model::channel::{Message, Reaction, ReactionType};
use serenity::model::id::EmojiId;
use serenity::model::user::User;

pub fn chat_user(user: &User) -> ChatUser {
    ChatUser {
        id: user.id.get(),
        name: user.name.clone(),
        bot: user.bot,
    }
}

pub fn chat_message(msg: &Message) -> ChatMessage {
    let embeds = msg
        .embeds
        .iter()
        .map(|e| MessageEmbed {
            title: e.title.clone(),
            author_name: e.author.as_ref().map(|a| a.name.clone()),
            description: e.description.clone(),
            footer_text: e.footer.as_ref().map(|f| f.text.clone()),
        })
        .collect();

    let reactions = msg
        .reactions
        .iter()
        .map(|r| emoji(&r.reaction_type))
        .collect();

    ChatMessage {
        id: msg.id.get(),
        channel_id: msg.channel_id.get(),
        guild_id: msg.guild_id.map(|g| g.get()),
        author: chat_user(&msg.author),
        content: msg.content.clone(),
        embeds,
        mentions: msg.mentions.iter().map(|u| u.id.get()).collect(),
        reactions,
    }
}

pub fn reaction_event(reaction: &Reaction) -> ReactionEvent {
    ReactionEvent {
        message_id: reaction.message_id.get(),
        channel_id: reaction.channel_id.get(),
        guild_id: reaction.guild_id.map(|g| g.get()),
        user_id: reaction.user_id.map_or(0, |u| u.get()),
        emoji: emoji(&reaction.emoji),
    }
}

pub fn emoji(reaction: &ReactionType) -> Emoji {
    match reaction {
        ReactionType::Unicode(s) => Emoji {
            id: None,
            name: s.clone(),
            animated: false,
        },
        ReactionType::Custom { animated, id, name } => Emoji {
            id: Some(id.get()),
            name: name.clone().unwrap_or_default(),
            animated: *animated,
        },
        _ => Emoji {
            id: None,
            name: String::new(),
            animated: false,
        },
    }
}

pub fn reaction_type(emoji: &Emoji) -> ReactionType {
    match emoji.id {
        Some(id) => ReactionType::Custom {
            animated: emoji.animated,
            id: EmojiId::new(id),
            name: Some(emoji.name.clone()),
        },
        None => ReactionType::Unicode(emoji.name.clone()),
    }
}
