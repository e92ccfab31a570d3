//! Port for booking persistence and the admission-critical write paths.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Booking, BookingStatus, StayRange, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by booking repository adapters.
    pub enum BookingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "booking repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "booking repository query failed: {message}",
    }
}

/// Result of the atomic check-then-insert admission write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// The booking was inserted; the stay is admitted.
    Created,
    /// An overlapping booking for the same (guest, listing) already exists.
    Overlapping,
}

/// Port for booking reads, admission writes and lifecycle transitions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Whether any booking for (guest, listing) overlaps the stay. Pure read.
    async fn has_overlap(
        &self,
        guest_id: &UserId,
        listing_id: &Uuid,
        stay: &StayRange,
    ) -> Result<bool, BookingRepositoryError>;

    /// Insert the booking unless an overlapping one exists for the same
    /// (guest, listing).
    ///
    /// The overlap re-check and the insert MUST form one atomic unit with
    /// respect to concurrent calls for the same pair; adapters serialise
    /// them in a transaction and rely on the uniqueness constraint on
    /// (guest, listing, check-in, check-out) as the last-resort backstop.
    async fn insert_if_vacant(
        &self,
        booking: &Booking,
    ) -> Result<AdmissionOutcome, BookingRepositoryError>;

    /// Find a booking by id.
    async fn find_by_id(
        &self,
        booking_id: &Uuid,
    ) -> Result<Option<Booking>, BookingRepositoryError>;

    /// Compare-and-set lifecycle step: moves the booking from `from` to `to`
    /// and reports whether a row actually changed. A `false` return means
    /// the booking was absent or no longer in `from`.
    async fn transition_status(
        &self,
        booking_id: &Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<bool, BookingRepositoryError>;

    /// Hard-delete the guest's booking while it is still `Booked`. Reports
    /// whether a row was removed.
    async fn delete_if_booked(
        &self,
        booking_id: &Uuid,
        guest_id: &UserId,
    ) -> Result<bool, BookingRepositoryError>;

    /// The guest's earliest `Finished` booking for the listing, if any.
    async fn find_finished_for(
        &self,
        guest_id: &UserId,
        listing_id: &Uuid,
    ) -> Result<Option<Booking>, BookingRepositoryError>;

    /// The guest's bookings that are not yet `Reviewed`, newest first.
    async fn list_active_for_guest(
        &self,
        guest_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError>;

    /// All bookings on listings owned by the principal, newest first.
    async fn list_for_owner(
        &self,
        owner_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError>;
}

/// Fixture repository for tests that do not exercise booking persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBookingRepository;

#[async_trait]
impl BookingRepository for FixtureBookingRepository {
    async fn has_overlap(
        &self,
        _guest_id: &UserId,
        _listing_id: &Uuid,
        _stay: &StayRange,
    ) -> Result<bool, BookingRepositoryError> {
        Ok(false)
    }

    async fn insert_if_vacant(
        &self,
        _booking: &Booking,
    ) -> Result<AdmissionOutcome, BookingRepositoryError> {
        Ok(AdmissionOutcome::Created)
    }

    async fn find_by_id(
        &self,
        _booking_id: &Uuid,
    ) -> Result<Option<Booking>, BookingRepositoryError> {
        Ok(None)
    }

    async fn transition_status(
        &self,
        _booking_id: &Uuid,
        _from: BookingStatus,
        _to: BookingStatus,
    ) -> Result<bool, BookingRepositoryError> {
        Ok(false)
    }

    async fn delete_if_booked(
        &self,
        _booking_id: &Uuid,
        _guest_id: &UserId,
    ) -> Result<bool, BookingRepositoryError> {
        Ok(false)
    }

    async fn find_finished_for(
        &self,
        _guest_id: &UserId,
        _listing_id: &Uuid,
    ) -> Result<Option<Booking>, BookingRepositoryError> {
        Ok(None)
    }

    async fn list_active_for_guest(
        &self,
        _guest_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_for_owner(
        &self,
        _owner_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        Ok(Vec::new())
    }
}
