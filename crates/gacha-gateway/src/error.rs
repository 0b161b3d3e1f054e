//! Error types for gateway operations

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for chat gateway operations
#[derive(Debug, Error)]
pub enum Error {
    #[error("Send error: {0}")]
    Send(String),

    #[error("Reaction error: {0}")]
    React(String),

    #[error("Typing error: {0}")]
    Typing(String),
}
