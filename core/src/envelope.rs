//! Response envelope decoding.
//!
//! # Design
//! The remote API wraps payloads in `{success, message, data}`. Decoding is a
//! tagged union: a body that carries a boolean `success` becomes
//! [`Decoded::Envelope`], any other JSON becomes [`Decoded::NonConforming`]
//! so each operation has to decide explicitly what a misbehaving backend
//! means for it. Non-2xx responses never reach the caller as data; they fail
//! with `ApiError::Api` and a display message derived from the body.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ApiError;
use crate::http::HttpResponse;

/// Message cap for non-2xx JSON bodies that carry no `message` field.
pub const JSON_MESSAGE_LIMIT: usize = 200;
/// Message cap for non-2xx plain-text bodies.
pub const TEXT_MESSAGE_LIMIT: usize = 500;

pub const NO_CONTENT_MESSAGE: &str = "Operation successful (No Content)";
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Operation successful";
pub const DEFAULT_FAILURE_MESSAGE: &str = "Request failed";

/// The `{success, message, data}` wrapper.
///
/// `data: None` means the field was absent; `Some(Value::Null)` means the
/// server sent an explicit null.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<Value>,
}

impl Envelope {
    fn from_object(mut object: Map<String, Value>, success: bool) -> Self {
        let message = match object.remove("message") {
            Some(Value::String(message)) => Some(message),
            _ => None,
        };
        Self {
            success,
            message,
            data: object.remove("data"),
        }
    }

    /// `success` implies `data` is present (possibly null); failure implies
    /// a non-empty message.
    pub fn is_well_formed(&self) -> bool {
        if self.success {
            self.data.is_some()
        } else {
            self.message.as_deref().is_some_and(|m| !m.trim().is_empty())
        }
    }

    /// Message to surface for a `success: false` envelope.
    pub fn failure_message(&self) -> String {
        match self.message.as_deref().map(str::trim) {
            Some(message) if !message.is_empty() => message.to_string(),
            _ => DEFAULT_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Outcome of decoding a 2xx response.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// The body followed the envelope convention.
    Envelope(Envelope),
    /// Valid JSON without a boolean `success` field, passed through as-is.
    NonConforming(Value),
}

/// Interpret a raw response as an envelope.
pub fn decode(response: &HttpResponse) -> Result<Decoded, ApiError> {
    if !response.is_success() {
        return Err(error_from_response(response));
    }

    if response.status == 204 {
        return Ok(Decoded::Envelope(Envelope {
            success: true,
            message: Some(NO_CONTENT_MESSAGE.to_string()),
            data: None,
        }));
    }

    if response.is_json() {
        if response.body.trim().is_empty() {
            return Err(ApiError::UnexpectedResponse);
        }
        let value: Value = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;
        return Ok(classify(value));
    }

    debug!(status = response.status, "decoding non-JSON success body");
    let message = if response.body.trim().is_empty() {
        DEFAULT_SUCCESS_MESSAGE.to_string()
    } else {
        response.body.clone()
    };
    Ok(Decoded::Envelope(Envelope {
        success: true,
        message: Some(message),
        data: Some(Value::String(response.body.clone())),
    }))
}

fn classify(value: Value) -> Decoded {
    match value {
        Value::Object(object) => match object.get("success").and_then(Value::as_bool) {
            Some(success) => Decoded::Envelope(Envelope::from_object(object, success)),
            None => Decoded::NonConforming(Value::Object(object)),
        },
        other => Decoded::NonConforming(other),
    }
}

fn error_from_response(response: &HttpResponse) -> ApiError {
    let status = response.status;

    if response.is_json() {
        if let Ok(value) = serde_json::from_str::<Value>(&response.body) {
            let message = message_field(&value)
                .unwrap_or_else(|| truncate(&value.to_string(), JSON_MESSAGE_LIMIT));
            debug!(status, "non-2xx JSON response");
            return ApiError::Api {
                status,
                message,
                raw_data: Some(value),
            };
        }
    }

    let body = response.body.trim();
    let message = if body.is_empty() {
        format!("{status} {}", response.status_text).trim().to_string()
    } else {
        truncate(body, TEXT_MESSAGE_LIMIT)
    };
    debug!(status, "non-2xx text response");
    ApiError::Api {
        status,
        message,
        raw_data: None,
    }
}

/// `message`, then `messages` (string or list of strings).
fn message_field(value: &Value) -> Option<String> {
    ["message", "messages"].iter().find_map(|key| match value.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    })
}

/// Keep at most `limit` characters, never splitting one.
fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
