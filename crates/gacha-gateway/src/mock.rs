//! In-memory mock gateway for unit testing without a real chat connection.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use gacha_types::Emoji;
use tokio::sync::Notify;

use crate::error::{Error, Result};
use crate::gateway::Gateway;

/// One recorded outbound operation.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Send {
        channel_id: u64,
        content: String,
    },
    React {
        channel_id: u64,
        message_id: u64,
        emoji: Emoji,
    },
    Typing {
        channel_id: u64,
    },
}

/// In-memory gateway that records all outbound operations.
/// Use in tests instead of a real chat connection.
///
/// # Example
/// ```rust,ignore
/// let gateway = MockGateway::new();
/// tracker.refresh(channel_id).await;
/// assert_eq!(gateway.sent_messages(), vec![(channel_id, "$tu".to_string())]);
/// ```
pub struct MockGateway {
    calls: Mutex<Vec<GatewayCall>>,
    notify: Notify,
    next_message_id: AtomicU64,
    fail_sends: AtomicBool,
    fail_reactions: AtomicBool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            notify: Notify::new(),
            next_message_id: AtomicU64::new(1000),
            fail_sends: AtomicBool::new(false),
            fail_reactions: AtomicBool::new(false),
        }
    }

    /// Return a snapshot of all recorded calls in operation order.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Return just the sent messages as (channel id, content) pairs.
    pub fn sent_messages(&self) -> Vec<(u64, String)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|call| match call {
                GatewayCall::Send {
                    channel_id,
                    content,
                } => Some((*channel_id, content.clone())),
                _ => None,
            })
            .collect()
    }

    /// Return just the added reactions as (message id, emoji) pairs.
    pub fn reactions(&self) -> Vec<(u64, Emoji)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|call| match call {
                GatewayCall::React {
                    message_id, emoji, ..
                } => Some((*message_id, emoji.clone())),
                _ => None,
            })
            .collect()
    }

    /// Make subsequent `send_message` calls fail.
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `add_reaction` calls fail.
    pub fn set_fail_reactions(&self, fail: bool) {
        self.fail_reactions.store(fail, Ordering::SeqCst);
    }

    /// Wait until at least `count` calls have been recorded.
    /// Failed operations are recorded too.
    pub async fn wait_for_calls(&self, count: usize) {
        loop {
            let notified = self.notify.notified();
            if self.calls.lock().unwrap().len() >= count {
                return;
            }
            notified.await;
        }
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
        self.notify.notify_waiters();
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl Gateway for MockGateway {
    async fn send_message(&self, channel_id: u64, content: &str) -> Result<u64> {
        self.record(GatewayCall::Send {
            channel_id,
            content: content.to_string(),
        });
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(Error::Send("mock failure".to_string()));
        }
        Ok(self.next_message_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn add_reaction(&self, channel_id: u64, message_id: u64, emoji: &Emoji) -> Result<()> {
        self.record(GatewayCall::React {
            channel_id,
            message_id,
            emoji: emoji.clone(),
        });
        if self.fail_reactions.load(Ordering::SeqCst) {
            return Err(Error::React("mock failure".to_string()));
        }
        Ok(())
    }

    async fn trigger_typing(&self, channel_id: u64) -> Result<()> {
        self.record(GatewayCall::Typing { channel_id });
        Ok(())
    }
}
