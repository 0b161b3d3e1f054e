//! Correlates sent commands with the game bot's next reply.
//!
//! A caller registers interest in a channel, sends its command, then waits
//! on the returned ticket with a bounded timeout. Every inbound game-bot
//! message is offered to all open tickets for its channel; a predicate per
//! ticket picks out the reply shape the caller expects.

use std::sync::Mutex;
use std::time::Duration;

use gacha_types::ChatMessage;
use tokio::sync::oneshot;
use tokio::time::timeout;

type Predicate = Box<dyn Fn(&ChatMessage) -> bool + Send>;

struct Waiter {
    channel_id: u64,
    predicate: Predicate,
    tx: oneshot::Sender<ChatMessage>,
}

/// Routes game-bot messages to pending response tickets.
#[derive(Default)]
pub struct ResponseRouter {
    waiters: Mutex<Vec<Waiter>>,
}

impl ResponseRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers interest in the next message in `channel_id` accepted by
    /// `predicate`. Register before sending the command the response is
    /// expected for, or a fast reply can slip past.
    pub fn register(
        &self,
        channel_id: u64,
        predicate: impl Fn(&ChatMessage) -> bool + Send + 'static,
    ) -> ResponseTicket {
        let (tx, rx) = oneshot::channel();
        self.waiters.lock().unwrap().push(Waiter {
            channel_id,
            predicate: Box::new(predicate),
            tx,
        });
        ResponseTicket { rx }
    }

    /// Offers a game-bot message to every open ticket for its channel.
    /// Tickets whose waiters already gave up are dropped along the way.
    pub fn deliver(&self, message: &ChatMessage) {
        let mut waiters = self.waiters.lock().unwrap();
        let mut kept = Vec::with_capacity(waiters.len());

        for waiter in waiters.drain(..) {
            if waiter.tx.is_closed() {
                continue;
            }
            if waiter.channel_id == message.channel_id && (waiter.predicate)(message) {
                let _ = waiter.tx.send(message.clone());
            } else {
                kept.push(waiter);
            }
        }

        *waiters = kept;
    }

    #[cfg(test)]
    fn open_waiters(&self) -> usize {
        self.waiters.lock().unwrap().len()
    }
}

/// One-shot handle for a response registered with [`ResponseRouter`].
pub struct ResponseTicket {
    rx: oneshot::Receiver<ChatMessage>,
}

impl ResponseTicket {
    /// Waits for the matching message, giving up after `wait`.
    pub async fn wait(self, wait: Duration) -> Option<ChatMessage> {
        match timeout(wait, self.rx).await {
            Ok(Ok(message)) => Some(message),
            _ => None,
        }
    }
}
