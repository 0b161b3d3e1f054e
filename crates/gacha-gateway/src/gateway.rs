//! Outbound chat operations used by the engine.

use std::future::Future;

use gacha_types::Emoji;

use crate::error::Result;

/// Trait for the chat operations the engine performs.
/// Implemented by the Discord adapter in the binary crate and by
/// `MockGateway` (in-memory, tests).
///
/// Methods return `Send` futures so engine tasks built over a generic
/// gateway can be spawned onto the runtime.
pub trait Gateway: Send + Sync + 'static {
    /// Send a plain text message, returning the id of the created message.
    fn send_message(
        &self,
        channel_id: u64,
        content: &str,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// Add a reaction to an existing message.
    fn add_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &Emoji,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Show the typing indicator in a channel.
    fn trigger_typing(&self, channel_id: u64) -> impl Future<Output = Result<()>> + Send;
}
