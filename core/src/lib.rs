//! Synchronous API client core for the feedback service.
//!
//! # Overview
//! Builds `HttpRequest` values and decodes `HttpResponse` values without
//! touching the network (host-does-IO pattern). Hosts either execute the
//! round-trip themselves between `build_*` and `parse_*`, or hand the client
//! a [`Transport`].
//!
//! # Design
//! - `FeedbackClient` holds its config and an injected credential provider, nothing else.
//! - Responses pass through the envelope decoder, which separates
//!   conforming `{success, message, data}` bodies from other JSON.
//! - Aggregation (`filter_by_rating`, `summarize`) is pure and works on any
//!   slice the caller already holds.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod credential;
pub mod envelope;
pub mod error;
pub mod http;
pub mod types;
pub mod view;

pub use client::FeedbackClient;
pub use config::{ClientConfig, ConfigError};
pub use credential::{Anonymous, CredentialProvider, StaticToken};
pub use envelope::{decode, Decoded, Envelope};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use types::{NewReview, Rating, Review, ReviewId};
pub use view::{filter_by_rating, summarize, RatingFilter, Summary};
