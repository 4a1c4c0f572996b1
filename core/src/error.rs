//! Error types for the feedback API client.
//!
//! # Design
//! Every failure a caller can display is a typed variant. Non-2xx responses
//! land in `Api` with the message the decoder derived from the body;
//! `success:false` envelopes become `Submission` or `List` depending on the
//! operation. Nothing in the core retries.

use serde_json::Value;
use thiserror::Error;

/// Errors returned by `FeedbackClient` and the envelope decoder.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An operation that needs a bearer token was invoked without one.
    #[error("authentication required")]
    AuthRequired,

    /// The server returned a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Api {
        status: u16,
        message: String,
        raw_data: Option<Value>,
    },

    /// The submit envelope decoded with `success: false`.
    #[error("submission failed: {0}")]
    Submission(String),

    /// The list envelope decoded with `success: false`.
    #[error("listing failed: {0}")]
    List(String),

    /// The envelope succeeded but the payload does not match the operation.
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),

    /// A status/content combination the decoder cannot interpret.
    #[error("unexpected response type")]
    UnexpectedResponse,

    /// Caller input failed a precondition; no request was built.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The host transport failed before a response was received.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ApiError {
    /// HTTP status for `Api` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Stable discriminator, used across the FFI boundary and in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::AuthRequired => "auth_required",
            ApiError::Api { .. } => "api",
            ApiError::Submission(_) => "submission",
            ApiError::List(_) => "list",
            ApiError::UnexpectedShape(_) => "unexpected_shape",
            ApiError::UnexpectedResponse => "unexpected_response",
            ApiError::Validation(_) => "validation",
            ApiError::Serialization(_) => "serialization",
            ApiError::Deserialization(_) => "deserialization",
            ApiError::Transport(_) => "transport",
        }
    }

    /// The message meant for display, without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            ApiError::Api { message, .. } => message.clone(),
            ApiError::Submission(msg)
            | ApiError::List(msg)
            | ApiError::UnexpectedShape(msg)
            | ApiError::Validation(msg)
            | ApiError::Serialization(msg)
            | ApiError::Deserialization(msg)
            | ApiError::Transport(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}
