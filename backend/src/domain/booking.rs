//! Booking aggregate: stay ranges, the lifecycle state machine and the
//! validated booking entity.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::UserId;

/// Validation errors raised by booking constructors and transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingValidationError {
    /// `check_in` is not strictly before `check_out`.
    #[error("check-in {check_in} must be strictly before check-out {check_out}")]
    InvertedStay {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },
    /// A stay needs at least one guest.
    #[error("guest count must be at least 1, got {guest_count}")]
    NoGuests { guest_count: i32 },
    /// Negative amounts cannot be billed.
    #[error("amount due must not be negative, got {amount_due}")]
    NegativeAmount { amount_due: i64 },
    /// The requested status change is not a forward step of the lifecycle.
    #[error("booking cannot move from {from} to {to}")]
    InvalidTransition { from: BookingStatus, to: BookingStatus },
    /// Persisted status text does not name a lifecycle state.
    #[error("unknown booking status {value:?}")]
    UnknownStatus { value: String },
}

/// Half-open stay interval `[check_in, check_out)`.
///
/// A checkout on day X and a new check-in on day X do not overlap, so
/// back-to-back stays are admissible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayRange {
    /// Validate and construct a stay range.
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, BookingValidationError> {
        if check_in >= check_out {
            return Err(BookingValidationError::InvertedStay {
                check_in,
                check_out,
            });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// First night of the stay.
    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    /// Morning of departure; not itself part of the stay.
    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Half-open interval overlap test.
    pub fn overlaps(&self, other: &StayRange) -> bool {
        self.check_in < other.check_out && self.check_out > other.check_in
    }
}

/// Lifecycle state of a booking.
///
/// Transitions run strictly forward: `Booked → Finished → Reviewed`. There
/// are no back-transitions and no skipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    /// Admitted stay awaiting checkout.
    Booked,
    /// Stay confirmed over by the listing owner.
    Finished,
    /// Guest filed the review for this stay.
    Reviewed,
}

impl BookingStatus {
    /// Whether `next` is the legal forward step from this state.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Booked, BookingStatus::Finished)
                | (BookingStatus::Finished, BookingStatus::Reviewed)
        )
    }

    /// Stable text persisted to the store.
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Booked => "Booked",
            BookingStatus::Finished => "Finished",
            BookingStatus::Reviewed => "Reviewed",
        }
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = BookingValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Booked" => Ok(BookingStatus::Booked),
            "Finished" => Ok(BookingStatus::Finished),
            "Reviewed" => Ok(BookingStatus::Reviewed),
            other => Err(BookingValidationError::UnknownStatus {
                value: other.to_owned(),
            }),
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input payload for [`Booking::new`].
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub id: Uuid,
    pub guest_id: UserId,
    pub listing_id: Uuid,
    pub stay: StayRange,
    pub guest_count: i32,
    pub amount_due: i64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// A reserved stay on a listing by a guest for a date range.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    id: Uuid,
    guest_id: UserId,
    listing_id: Uuid,
    stay: StayRange,
    guest_count: i32,
    amount_due: i64,
    status: BookingStatus,
    created_at: DateTime<Utc>,
}

impl Booking {
    /// Creates a validated booking.
    pub fn new(draft: BookingDraft) -> Result<Self, BookingValidationError> {
        if draft.guest_count < 1 {
            return Err(BookingValidationError::NoGuests {
                guest_count: draft.guest_count,
            });
        }
        if draft.amount_due < 0 {
            return Err(BookingValidationError::NegativeAmount {
                amount_due: draft.amount_due,
            });
        }
        Ok(Self {
            id: draft.id,
            guest_id: draft.guest_id,
            listing_id: draft.listing_id,
            stay: draft.stay,
            guest_count: draft.guest_count,
            amount_due: draft.amount_due,
            status: draft.status,
            created_at: draft.created_at,
        })
    }

    /// Returns the booking id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the guest who reserved the stay.
    pub fn guest_id(&self) -> &UserId {
        &self.guest_id
    }

    /// Returns the reserved listing id.
    pub fn listing_id(&self) -> Uuid {
        self.listing_id
    }

    /// Returns the stay interval.
    pub fn stay(&self) -> &StayRange {
        &self.stay
    }

    /// Returns the headcount for the stay.
    pub fn guest_count(&self) -> i32 {
        self.guest_count
    }

    /// Returns the amount due, in minor currency units.
    pub fn amount_due(&self) -> i64 {
        self.amount_due
    }

    /// Returns the lifecycle state.
    pub fn status(&self) -> BookingStatus {
        self.status
    }

    /// Returns the creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The same booking one legal lifecycle step further.
    pub fn transitioned(self, next: BookingStatus) -> Result<Self, BookingValidationError> {
        if !self.status.can_transition_to(next) {
            return Err(BookingValidationError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        Ok(Self {
            status: next,
            ..self
        })
    }
}
