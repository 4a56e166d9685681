//! Error types for the REST entity client.
//!
//! # Design
//! Every non-success HTTP status lands in `Http` with the raw status code,
//! reason phrase and body text, because callers receive failures through
//! progress notifications and need the original response details intact.
//! Transport and JSON boundary failures get their own variants so handlers
//! can tell "the server rejected this" apart from "the call never reached
//! the server".

use thiserror::Error;

/// Errors raised by client operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a status outside the expected range.
    #[error("HTTP {status} {reason}: {body}")]
    Http {
        status: u16,
        reason: String,
        body: String,
    },

    /// The request never completed at the transport level.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response could not be decoded into the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// Store or delete was attempted on an entity without an identifier.
    #[error("entity has no identifier")]
    MissingId,
}

impl ApiError {
    /// The HTTP status code carried by an `Http` failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
