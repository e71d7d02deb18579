//! Error types for push message decoding.

use thiserror::Error;

/// Errors that can occur when decoding a push channel frame.
#[derive(Debug, Error, Clone)]
pub enum MessageError {
    /// The message type is unknown.
    #[error("unknown message type: {0}")]
    UnknownType(String),

    /// The message payload does not match its declared type.
    #[error("invalid message payload: {0}")]
    InvalidPayload(String),

    /// The frame is not valid JSON.
    #[error("malformed frame: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for MessageError {
    fn from(err: serde_json::Error) -> Self {
        MessageError::Malformed(err.to_string())
    }
}
