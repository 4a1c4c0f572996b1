//! Domain DTOs for the feedback API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! integration tests catch any schema drift between the two crates. Wire
//! values the backend is loose about (ids, ratings) are normalized to strings
//! at the boundary and interpreted on demand.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::ApiError;

/// Opaque identifier assigned by the remote system. The wire may carry a
/// string or an integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReviewId(String);

impl ReviewId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ReviewId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ReviewId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) if !s.is_empty() => Ok(Self(s)),
            Value::Number(n) => Ok(Self(n.to_string())),
            other => Err(serde::de::Error::custom(format!("invalid review id: {other}"))),
        }
    }
}

/// A 1–5 rating kept in its decimal string form.
///
/// Comparisons go through [`Rating::value`]; a rating that does not parse
/// is kept as-is so a misbehaving backend cannot fail a whole listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rating(String);

impl Rating {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 5;

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Integer value of the rating. Fractional forms truncate toward zero
    /// (`"4.5"` is 4); anything non-numeric, or a float outside ±1e18, is
    /// `None`.
    pub fn value(&self) -> Option<i64> {
        let raw = self.0.trim();
        raw.parse::<i64>().ok().or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|v| (-1e18..1e18).contains(v))
                .map(|v| v.trunc() as i64)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// True for a whole number in `MIN..=MAX` (`"4"` or `"4.0"`, not `"4.5"`).
    pub fn is_valid(&self) -> bool {
        let whole = self.0.trim().parse::<f64>().is_ok_and(|v| v.fract() == 0.0);
        whole && self.value().is_some_and(|v| (Self::MIN..=Self::MAX).contains(&v))
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Rating {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

impl From<String> for Rating {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

macro_rules! rating_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Rating {
            fn from(value: $ty) -> Self {
                Self(value.to_string())
            }
        })*
    };
}

rating_from_int!(u8, u16, u32, u64, i32, i64);

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(Self::from(s)),
            Value::Number(n) => Ok(Self(n.to_string())),
            _ => Ok(Self::default()),
        }
    }
}

/// `null` reads as an empty string.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Any non-string value reads as absent.
fn text_or_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// One feedback entry as returned by the API.
///
/// Only `id` is strict. Text fields tolerate `null`, and a rating that is not
/// a string or number reads as empty, so one sloppy record does not fail a
/// whole listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default)]
    pub rating: Rating,
    #[serde(
        default,
        alias = "submittedAt",
        alias = "created_at",
        alias = "createdAt",
        deserialize_with = "text_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub submitted_at: Option<String>,
    /// Administrative reply; absent at creation.
    #[serde(default, deserialize_with = "text_or_none", skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

/// Request payload for submitting a review. `rating` travels as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    pub content: String,
    pub rating: Rating,
}

impl NewReview {
    /// Validated payload: trimmed non-empty content and a rating in 1..=5,
    /// normalized to its integer decimal form.
    pub fn new(content: &str, rating: impl Into<Rating>) -> Result<Self, ApiError> {
        let draft = Self {
            content: content.trim().to_string(),
            rating: rating.into(),
        };
        draft.validate()?;
        let value = draft.rating.value().unwrap_or_default();
        Ok(Self {
            rating: Rating::from(value),
            ..draft
        })
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.content.trim().is_empty() {
            return Err(ApiError::Validation("content must not be empty".to_string()));
        }
        if self.rating.is_empty() {
            return Err(ApiError::Validation("rating is required".to_string()));
        }
        if !self.rating.is_valid() {
            return Err(ApiError::Validation(format!(
                "rating must be an integer between {} and {}, got {:?}",
                Rating::MIN,
                Rating::MAX,
                self.rating.as_str()
            )));
        }
        Ok(())
    }
}
