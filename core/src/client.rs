//! Stateless request builder and response parser for the feedback API.
//!
//! # Design
//! `FeedbackClient` holds only its configuration and an injected
//! [`CredentialProvider`]. Each operation is split into a `build_*` method
//! that produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`; `submit` and `list_all` run both halves around a single
//! [`Transport::execute`] call for hosts that provide a transport.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::credential::{bearer_token, CredentialProvider};
use crate::envelope::{decode, Decoded};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::types::{NewReview, Rating, Review};

pub const SUBMIT_PATH: &str = "feedback/feedback";
pub const LIST_PATH: &str = "feedback/list_feedback";

/// Client for the feedback resource.
#[derive(Clone)]
pub struct FeedbackClient {
    config: ClientConfig,
    credentials: Arc<dyn CredentialProvider>,
}

impl fmt::Debug for FeedbackClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedbackClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FeedbackClient {
    pub fn new(config: ClientConfig, credentials: impl CredentialProvider + 'static) -> Self {
        Self {
            config: config.normalized(),
            credentials: Arc::new(credentials),
        }
    }

    pub fn with_shared_credentials(config: ClientConfig, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            config: config.normalized(),
            credentials,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the authenticated POST for a new review.
    ///
    /// Fails with `Validation` for bad input and `AuthRequired` when no token
    /// is available; in both cases nothing should be sent.
    pub fn build_submit(&self, input: &NewReview) -> Result<HttpRequest, ApiError> {
        input.validate()?;
        let token = bearer_token(self.credentials.as_ref()).ok_or(ApiError::AuthRequired)?;
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let path = self.config.endpoint(SUBMIT_PATH);
        debug!(%path, "built submit request");
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path,
            headers: vec![
                ("accept".to_string(), "*/*".to_string()),
                ("content-type".to_string(), "application/json".to_string()),
                ("authorization".to_string(), format!("Bearer {token}")),
            ],
            body: Some(body),
        })
    }

    /// Build the GET for the review list. The token is attached when present;
    /// its absence is left for the server to judge.
    pub fn build_list_all(&self) -> HttpRequest {
        let mut headers = vec![("accept".to_string(), "*/*".to_string())];
        if let Some(token) = bearer_token(self.credentials.as_ref()) {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        let path = self.config.endpoint(LIST_PATH);
        debug!(%path, authenticated = headers.len() > 1, "built list request");
        HttpRequest {
            method: HttpMethod::Get,
            path,
            headers,
            body: None,
        }
    }

    pub fn parse_submit(&self, response: HttpResponse) -> Result<Review, ApiError> {
        match decode(&response)? {
            Decoded::Envelope(envelope) if envelope.success => match envelope.data {
                Some(data) if has_id(&data) => {
                    serde_json::from_value(data).map_err(|e| ApiError::UnexpectedShape(e.to_string()))
                }
                _ => Err(ApiError::UnexpectedShape(
                    "submit response carries no review id".to_string(),
                )),
            },
            Decoded::Envelope(envelope) => Err(ApiError::Submission(envelope.failure_message())),
            Decoded::NonConforming(_) => {
                warn!(status = response.status, "submit response is not an envelope");
                Err(ApiError::UnexpectedShape(
                    "submit response is not an envelope".to_string(),
                ))
            }
        }
    }

    /// Parse the review list.
    ///
    /// A successful envelope whose `data` is not an array yields an empty
    /// list, as does non-envelope JSON that is not a bare array.
    pub fn parse_list_all(&self, response: HttpResponse) -> Result<Vec<Review>, ApiError> {
        match decode(&response)? {
            Decoded::Envelope(envelope) if envelope.success => match envelope.data {
                Some(Value::Array(items)) => reviews_from(items),
                other => {
                    warn!(
                        status = response.status,
                        data = data_kind(other.as_ref()),
                        "list envelope data is not an array; returning no reviews"
                    );
                    Ok(Vec::new())
                }
            },
            Decoded::Envelope(envelope) => Err(ApiError::List(envelope.failure_message())),
            Decoded::NonConforming(Value::Array(items)) => {
                warn!(status = response.status, "list response is a bare array, not an envelope");
                reviews_from(items)
            }
            Decoded::NonConforming(other) => {
                warn!(
                    status = response.status,
                    data = data_kind(Some(&other)),
                    "list response is not an envelope; returning no reviews"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Validate, send and parse a new review in one round-trip.
    ///
    /// Fields the server leaves out of its echo are filled from the input.
    pub fn submit<T>(&self, transport: &T, content: &str, rating: impl Into<Rating>) -> Result<Review, ApiError>
    where
        T: Transport + ?Sized,
    {
        let input = NewReview::new(content, rating)?;
        let request = self.build_submit(&input)?;
        let mut review = self.parse_submit(transport.execute(request)?)?;
        if review.content.is_empty() {
            review.content = input.content;
        }
        if review.rating.is_empty() {
            review.rating = input.rating;
        }
        Ok(review)
    }

    /// Fetch every review in one round-trip.
    pub fn list_all<T>(&self, transport: &T) -> Result<Vec<Review>, ApiError>
    where
        T: Transport + ?Sized,
    {
        let request = self.build_list_all();
        self.parse_list_all(transport.execute(request)?)
    }
}

fn has_id(data: &Value) -> bool {
    data.get("id").is_some_and(|id| !id.is_null())
}

fn reviews_from(items: Vec<Value>) -> Result<Vec<Review>, ApiError> {
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            serde_json::from_value(item)
                .map_err(|e| ApiError::UnexpectedShape(format!("review at index {idx}: {e}")))
        })
        .collect()
}

fn data_kind(data: Option<&Value>) -> &'static str {
    match data {
        None => "absent",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "bool",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}
