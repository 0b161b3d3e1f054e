//! The assembled engine behind two platform event entry points.

use std::sync::Arc;

use gacha_gateway::{Clock, Gateway};
use gacha_types::{ChatMessage, ChatUser, ReactionEvent};
use tokio::sync::watch;

use crate::claimer::Claimer;
use crate::responses::ResponseRouter;
use crate::roller::Roller;
use crate::settings::SettingsRx;
use crate::tracker::StateTracker;

/// Wires the tracker, claimer and roller together. The embedding client
/// feeds platform events in and spawns the schedulers once.
pub struct Farm<G, C> {
    router: Arc<ResponseRouter>,
    tracker: Arc<StateTracker<G, C>>,
    claimer: Claimer<G, C>,
    roller: Arc<Roller<G, C>>,
    settings: SettingsRx,
}

impl<G: Gateway, C: Clock> Farm<G, C> {
    pub fn new(gateway: Arc<G>, clock: C, settings: SettingsRx, own_user: &ChatUser) -> Self {
        let router = Arc::new(ResponseRouter::new());
        let tracker = Arc::new(StateTracker::new(
            gateway.clone(),
            clock.clone(),
            router.clone(),
            settings.clone(),
            own_user.name.clone(),
        ));
        let claimer = Claimer::new(
            gateway.clone(),
            clock.clone(),
            tracker.clone(),
            router.clone(),
            settings.clone(),
            own_user.name.clone(),
        );
        let roller = Arc::new(Roller::new(
            gateway,
            clock,
            tracker.clone(),
            settings.clone(),
        ));
        Self {
            router,
            tracker,
            claimer,
            roller,
            settings,
        }
    }

    /// Feeds one inbound message through the engine.
    pub async fn on_message(&self, message: &ChatMessage) {
        let settings = self.settings.borrow().clone();
        if settings.game_bot.is_game_bot(&message.author) {
            // replies first: a waiting claim or refresh may be blocked on
            // this very message
            self.router.deliver(message);
            self.tracker.observe(message);
        }
        self.claimer.handle_announcement(message).await;
    }

    /// Feeds one reaction notification through the engine.
    pub async fn on_reaction(&self, reaction: &ReactionEvent) {
        self.claimer.handle_reaction(reaction).await;
    }

    /// Starts the refresh and roll schedulers. Both stop when `shutdown`
    /// flips to true.
    pub fn spawn_schedulers(&self, shutdown: watch::Receiver<bool>) {
        tokio::spawn(self.tracker.clone().run(shutdown.clone()));
        tokio::spawn(self.roller.clone().run(shutdown));
    }

    pub fn tracker(&self) -> &Arc<StateTracker<G, C>> {
        &self.tracker
    }
}
