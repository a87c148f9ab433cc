//! Error types for postwire-client.

use serde_json::Value;
use thiserror::Error;

/// Main error type for all postwire operations.
#[derive(Debug, Error)]
pub enum PostwireError {
    /// Malformed call, sender or transport setup (missing name, empty prefix, ...).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Argument shape rejected by a namespace method before sending.
    #[error("Validation error: {0}")]
    Validation(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The host channel refused to post a message.
    #[error("Transmit error: {0}")]
    Transmit(String),

    /// The host answered the call with an error payload.
    #[error("Remote error: {0}")]
    Remote(Value),

    /// The call was dropped before any response arrived.
    #[error("Call abandoned before a response arrived")]
    Abandoned,
}

/// Result type alias using PostwireError.
pub type Result<T> = std::result::Result<T, PostwireError>;
