//! Chat values as the engine sees them, independent of the platform SDK.

use serde::{Deserialize, Serialize};

/// A chat user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatUser {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub bot: bool,
}

/// One embed attached to a message, reduced to the fields the engine reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageEmbed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_text: Option<String>,
}

/// Emoji identity. `id` is set for platform custom emotes and `None` for
/// plain unicode glyphs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Emoji {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub animated: bool,
}

impl Emoji {
    /// A unicode glyph emoji.
    pub fn unicode(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            animated: false,
        }
    }

    /// A platform custom emote.
    pub fn custom(id: u64, name: &str) -> Self {
        Self {
            id: Some(id),
            name: name.to_string(),
            animated: false,
        }
    }
}

/// An inbound chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: u64,
    pub channel_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<u64>,
    pub author: ChatUser,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<MessageEmbed>,
    /// Ids of users mentioned in the message body.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<u64>,
    /// Reactions already attached when the message was delivered. Empty on
    /// live gateway messages; populated when history is fetched.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reactions: Vec<Emoji>,
}

/// A reaction-added notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReactionEvent {
    pub message_id: u64,
    pub channel_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<u64>,
    pub user_id: u64,
    pub emoji: Emoji,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_deserializes_without_optional_fields() {
        let json = serde_json::json!({
            "id": 1,
            "channel_id": 2,
            "author": { "id": 3, "name": "mudae" },
            "content": "hello"
        });
        let message: ChatMessage = serde_json::from_value(json).unwrap();
        assert!(!message.author.bot);
        assert!(message.embeds.is_empty());
        assert!(message.mentions.is_empty());
        assert!(message.reactions.is_empty());
        assert_eq!(message.guild_id, None);
    }

    #[test]
    fn test_emoji_serialization_skips_absent_id() {
        let unicode = serde_json::to_value(Emoji::unicode("💖")).unwrap();
        assert!(unicode.get("id").is_none());

        let custom = serde_json::to_value(Emoji::custom(42, "kakera")).unwrap();
        assert_eq!(custom["id"], 42);
    }
}
