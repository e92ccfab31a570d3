//! Rating score and the running rating aggregate kept on a listing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inclusive bounds of the rating scale.
pub const MIN_RATING: i32 = 1;
/// Upper bound of the rating scale.
pub const MAX_RATING: i32 = 5;

/// Validation errors for rating values and aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RatingValidationError {
    /// Score outside the accepted scale.
    #[error("rating must be between {MIN_RATING} and {MAX_RATING}, got {value}")]
    OutOfRange { value: i32 },
    /// Aggregate counters are inconsistent (negative, or a sum without votes).
    #[error("rating aggregate counters are inconsistent: sum={sum}, count={count}")]
    InconsistentAggregate { sum: i64, count: i64 },
}

/// A single validated review score on the 1–5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct RatingScore(i32);

impl RatingScore {
    /// Validate and construct a score.
    pub fn new(value: i32) -> Result<Self, RatingValidationError> {
        if !(MIN_RATING..=MAX_RATING).contains(&value) {
            return Err(RatingValidationError::OutOfRange { value });
        }
        Ok(Self(value))
    }

    /// The raw score value.
    pub fn value(&self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for RatingScore {
    type Error = RatingValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RatingScore> for i32 {
    fn from(value: RatingScore) -> Self {
        value.0
    }
}

/// Running rating counters on a listing.
///
/// The pair is only ever incremented (reviews cannot be deleted), and the
/// displayed average is derived on read, never stored. The store-level update
/// is an atomic increment; this type carries the same semantics for in-memory
/// call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingAggregate {
    sum: i64,
    count: i64,
}

impl RatingAggregate {
    /// The aggregate of an unrated listing.
    pub fn zero() -> Self {
        Self { sum: 0, count: 0 }
    }

    /// Construct from persisted counters, validating consistency.
    pub fn new(sum: i64, count: i64) -> Result<Self, RatingValidationError> {
        if sum < 0 || count < 0 || (count == 0 && sum != 0) {
            return Err(RatingValidationError::InconsistentAggregate { sum, count });
        }
        Ok(Self { sum, count })
    }

    /// Running numerator.
    pub fn sum(&self) -> i64 {
        self.sum
    }

    /// Number of reviews applied.
    pub fn count(&self) -> i64 {
        self.count
    }

    /// The aggregate after one more score.
    pub fn apply(self, score: RatingScore) -> Self {
        Self {
            sum: self.sum + i64::from(score.value()),
            count: self.count + 1,
        }
    }

    /// Average rating rounded to two decimals; `0.0` while unrated.
    #[allow(clippy::cast_precision_loss, reason = "counters stay far below 2^52")]
    pub fn displayed(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let average = self.sum as f64 / self.count as f64;
        (average * 100.0).round() / 100.0
    }
}

impl Default for RatingAggregate {
    fn default() -> Self {
        Self::zero()
    }
}
