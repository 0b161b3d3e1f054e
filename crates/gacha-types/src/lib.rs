//! Shared types for the gacha automation workspace.
//!
//! Platform-neutral chat values crossing the gateway boundary, the
//! character/currency domain types, and the serde-backed configuration
//! sections consumed by the engine.

pub mod chat;
pub mod config;
pub mod game;

pub use chat::{ChatMessage, ChatUser, Emoji, MessageEmbed, ReactionEvent};
pub use config::{
    AnimeWish, ClaimConfig, GachaConfig, GameBotConfig, RollConfig, StatusConfig, WishlistConfig,
};
pub use game::{CharacterInfo, KakeraKind};
