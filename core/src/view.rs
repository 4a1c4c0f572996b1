//! Pure aggregation over a fetched review list.
//!
//! Nothing here performs I/O or mutates its input. Ratings are compared by
//! integer value, so `"4"` and `4` are the same rating.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ApiError;
use crate::types::{Rating, Review};

/// Ratings at or above this count as satisfied.
pub const SATISFIED_THRESHOLD: i64 = 4;

/// Which reviews to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RatingFilter {
    #[default]
    All,
    Exact(i64),
}

impl FromStr for RatingFilter {
    type Err = ApiError;

    /// `"all"` (any case) or an integer rating.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(RatingFilter::All);
        }
        s.parse::<i64>()
            .map(RatingFilter::Exact)
            .map_err(|_| ApiError::Validation(format!("rating filter must be \"all\" or an integer, got {s:?}")))
    }
}

impl fmt::Display for RatingFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatingFilter::All => f.write_str("all"),
            RatingFilter::Exact(n) => write!(f, "{n}"),
        }
    }
}

impl From<i64> for RatingFilter {
    fn from(rating: i64) -> Self {
        RatingFilter::Exact(rating)
    }
}

/// Reviews matching `filter`, in input order. Reviews whose rating is not
/// numeric never match a specific rating.
pub fn filter_by_rating<'a>(reviews: &'a [Review], filter: &RatingFilter) -> Vec<&'a Review> {
    match filter {
        RatingFilter::All => reviews.iter().collect(),
        RatingFilter::Exact(wanted) => reviews
            .iter()
            .filter(|review| review.rating.value() == Some(*wanted))
            .collect(),
    }
}

/// Headline numbers for a review list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    /// Mean rating rounded to one decimal.
    pub average_rating: f64,
    /// Percentage of ratings at or above [`SATISFIED_THRESHOLD`], rounded.
    pub satisfaction_rate: u32,
}

/// Count, mean rating and satisfaction percentage.
///
/// Both ratios divide by `count`, the number of reviews. Only ratings in
/// `Rating::MIN..=Rating::MAX` add to the sum; a non-numeric or
/// out-of-range rating counts as a review that contributes nothing. Both
/// are 0 for an empty list.
pub fn summarize<'a, I>(reviews: I) -> Summary
where
    I: IntoIterator<Item = &'a Review>,
{
    let mut count = 0usize;
    let mut sum = 0u64;
    let mut satisfied = 0usize;

    for review in reviews {
        count += 1;
        let Some(value) = review.rating.value().filter(|v| (Rating::MIN..=Rating::MAX).contains(v)) else {
            continue;
        };
        sum += value as u64;
        if value >= SATISFIED_THRESHOLD {
            satisfied += 1;
        }
    }

    if count == 0 {
        return Summary {
            count,
            average_rating: 0.0,
            satisfaction_rate: 0,
        };
    }

    let average = sum as f64 / count as f64;
    Summary {
        count,
        average_rating: (average * 10.0).round() / 10.0,
        satisfaction_rate: (100.0 * satisfied as f64 / count as f64).round() as u32,
    }
}
