//! Claim correlation and state tracking engine for a chat gacha game.
//!
//! The engine watches a game bot's announcement messages, decides which
//! characters are worth claiming, correlates later reaction events back to
//! those announcements, and issues timed claim reactions. Per-channel
//! cooldowns and resource pools are inferred from the bot's free-form
//! status reports, refreshed on demand with single-flight deduplication.
//!
//! [`Farm`] wires everything together; the binary crate feeds it inbound
//! events and provides the [`gacha_gateway::Gateway`] it acts through.

pub mod claimer;
pub mod emoji;
pub mod farm;
pub mod game;
pub mod parser;
pub mod responses;
pub mod roller;
pub mod settings;
pub mod state;
pub mod tracker;
pub mod wishlist;

pub use claimer::Claimer;
pub use farm::Farm;
pub use game::GameBotMatcher;
pub use responses::{ResponseRouter, ResponseTicket};
pub use roller::Roller;
pub use settings::{FarmSettings, SettingsRx};
pub use state::ChannelState;
pub use tracker::StateTracker;
pub use wishlist::WishlistMatcher;
