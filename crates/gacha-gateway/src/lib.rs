//! Chat transport abstraction for the gacha engine.
//!
//! The engine only ever talks to a chat service through the [`Gateway`]
//! trait, and only ever reads time through the [`Clock`] trait. Both have
//! in-memory mocks so the engine's behaviour is testable without a live
//! connection.

pub mod clock;
pub mod error;
pub mod gateway;
pub mod mock;

pub use clock::{Clock, MockClock, SystemClock};
pub use error::{Error, Result};
pub use gateway::Gateway;
pub use mock::{GatewayCall, MockGateway};
