//! Error types for the Framed foundation layer.
//!
//! Only programmer-facing failures live here. Malformed *user* input never
//! produces one of these; the parsing path always recovers with a best-effort
//! result instead.

use thiserror::Error;

/// Errors raised while constructing platform messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// A field the adapter must always supply was not set.
    #[error("{platform} message is missing required field '{field}'")]
    MissingRequiredField {
        /// Platform the message was being built for.
        platform: &'static str,
        /// Name of the missing field.
        field: &'static str,
    },
}

impl MessageError {
    /// Creates a missing field error.
    pub fn missing(platform: &'static str, field: &'static str) -> Self {
        Self::MissingRequiredField { platform, field }
    }
}

/// Result type for message construction.
pub type MessageResult<T> = Result<T, MessageError>;
