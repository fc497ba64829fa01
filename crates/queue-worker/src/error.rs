//! Error types for queue operations.

use thiserror::Error;

/// Comprehensive error type for all queue operations
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Queue not found: {queue_name}")]
    QueueNotFound { queue_name: String },

    #[error("Message not found or receipt expired: {receipt}")]
    MessageNotFound { receipt: String },

    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Transport error ({transport}): {message}")]
    TransportError { transport: String, message: String },

    #[error("Consumer for queue '{queue_name}' was already started")]
    AlreadyStarted { queue_name: String },

    #[error("Consumer has not been started")]
    NotStarted,

    #[error("Consumer loop terminated abnormally: {message}")]
    LoopAborted { message: String },

    #[error("Codec error: {0}")]
    CodecError(#[from] CodecError),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationError),
}

impl QueueError {
    /// Check if error is transient from the transport's point of view
    pub fn is_transient(&self) -> bool {
        match self {
            Self::QueueNotFound { .. } => false,
            Self::MessageNotFound { .. } => false,
            Self::ConnectionFailed { .. } => true,
            Self::TransportError { .. } => true, // Provider-side errors are usually transient
            Self::AlreadyStarted { .. } => false,
            Self::NotStarted => false,
            Self::LoopAborted { .. } => false,
            Self::CodecError(_) => false,
            Self::ValidationError(_) => false,
        }
    }
}

/// Errors during message encoding/decoding
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON serialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Message body is not valid UTF-8")]
    InvalidUtf8,
}

/// Validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    Required { field: String },

    #[error("Invalid format for {field}: {message}")]
    InvalidFormat { field: String, message: String },

    #[error("Value out of range for {field}: {message}")]
    OutOfRange { field: String, message: String },
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
