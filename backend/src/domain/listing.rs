//! Listing entity carrying the running rating aggregate.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::rating::RatingAggregate;
use crate::domain::UserId;

/// Validation errors raised by listing constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingValidationError {
    /// Listings need a non-empty display name.
    #[error("listing name must not be empty")]
    EmptyName,
    /// Prices are stored in minor units and must not be negative.
    #[error("listing price must not be negative, got {price}")]
    NegativePrice { price: i64 },
    /// Persisted rate unit text does not name a billing period.
    #[error("unknown rate unit {value:?}")]
    UnknownRateUnit { value: String },
}

/// Billing period the listing price applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateUnit {
    PerDay,
    PerWeek,
    PerMonth,
}

impl RateUnit {
    /// Stable text persisted to the store.
    pub fn as_str(self) -> &'static str {
        match self {
            RateUnit::PerDay => "per_day",
            RateUnit::PerWeek => "per_week",
            RateUnit::PerMonth => "per_month",
        }
    }
}

impl std::str::FromStr for RateUnit {
    type Err = ListingValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "per_day" => Ok(RateUnit::PerDay),
            "per_week" => Ok(RateUnit::PerWeek),
            "per_month" => Ok(RateUnit::PerMonth),
            other => Err(ListingValidationError::UnknownRateUnit {
                value: other.to_owned(),
            }),
        }
    }
}

/// Input payload for [`Listing::new`].
#[derive(Debug, Clone)]
pub struct ListingDraft {
    pub id: Uuid,
    pub owner_id: UserId,
    pub name: String,
    pub price: i64,
    pub rate_unit: RateUnit,
    pub rating: RatingAggregate,
}

/// A rentable property record.
///
/// The rating counters are mutated only through review filing; the displayed
/// average is derived on read via [`Listing::displayed_rating`].
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    id: Uuid,
    owner_id: UserId,
    name: String,
    price: i64,
    rate_unit: RateUnit,
    rating: RatingAggregate,
}

impl Listing {
    /// Creates a validated listing.
    pub fn new(draft: ListingDraft) -> Result<Self, ListingValidationError> {
        if draft.name.trim().is_empty() {
            return Err(ListingValidationError::EmptyName);
        }
        if draft.price < 0 {
            return Err(ListingValidationError::NegativePrice { price: draft.price });
        }
        Ok(Self {
            id: draft.id,
            owner_id: draft.owner_id,
            name: draft.name,
            price: draft.price,
            rate_unit: draft.rate_unit,
            rating: draft.rating,
        })
    }

    /// Returns the listing id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the owning principal.
    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the price in minor currency units.
    pub fn price(&self) -> i64 {
        self.price
    }

    /// Returns the billing period of the price.
    pub fn rate_unit(&self) -> RateUnit {
        self.rate_unit
    }

    /// Returns the running rating counters.
    pub fn rating(&self) -> RatingAggregate {
        self.rating
    }

    /// Average rating rounded to two decimals; `0.0` while unrated.
    pub fn displayed_rating(&self) -> f64 {
        self.rating.displayed()
    }
}
