//! Stay admission control.
//!
//! Decides whether a proposed stay can be admitted for a listing. The check
//! is a pure read; the authoritative re-check happens inside the admission
//! transaction of the booking repository.
//!
//! Admission scope is deliberately per-(guest, listing): two different
//! guests may hold overlapping stays on the same listing without conflict.
//! This mirrors the behaviour the product currently ships and is a policy
//! to confirm with stakeholders, not an oversight to patch here.

use std::sync::Arc;

use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{BookingRepository, BookingRepositoryError};
use crate::domain::{Error, StayRange, UserId};

fn map_repository_error(error: BookingRepositoryError) -> Error {
    match error {
        BookingRepositoryError::Connection { message } => {
            Error::transient(format!("booking store unavailable: {message}"))
        }
        BookingRepositoryError::Query { message } => {
            Error::internal(format!("booking store error: {message}"))
        }
    }
}

/// Admission control over stay date ranges.
#[derive(Clone)]
pub struct AvailabilityChecker<B> {
    bookings: Arc<B>,
    clock: Arc<dyn Clock>,
}

impl<B> AvailabilityChecker<B> {
    /// Create a checker over the booking repository.
    pub fn new(bookings: Arc<B>, clock: Arc<dyn Clock>) -> Self {
        Self { bookings, clock }
    }
}

impl<B> AvailabilityChecker<B>
where
    B: BookingRepository,
{
    /// Admit or reject the proposed stay.
    ///
    /// Fails `InvalidRange` when the stay starts before today, and
    /// `Conflict` when an existing booking for the same (guest, listing)
    /// overlaps the half-open interval `[check_in, check_out)`. A checkout
    /// on day X and a new check-in on day X do not conflict.
    pub async fn check(
        &self,
        guest_id: &UserId,
        listing_id: &Uuid,
        stay: &StayRange,
    ) -> Result<(), Error> {
        let today = self.clock.utc().date_naive();
        if stay.check_in() < today {
            return Err(Error::invalid_range(format!(
                "check-in {} must not be in the past",
                stay.check_in()
            )));
        }

        let overlapping = self
            .bookings
            .has_overlap(guest_id, listing_id, stay)
            .await
            .map_err(map_repository_error)?;

        if overlapping {
            return Err(Error::conflict(
                "an existing booking for this listing overlaps the requested stay",
            ));
        }
        Ok(())
    }
}
