//! Driving port for booking mutations.
//!
//! Each operation takes the authenticated principal explicitly; the
//! transport layer resolves sessions to a [`UserId`] before calling in.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Booking, BookingStatus, Error, UserId};

/// Serializable booking representation shared by driving ports and cached
/// read views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    pub id: Uuid,
    pub guest_id: UserId,
    pub listing_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guest_count: i32,
    pub amount_due: i64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingPayload {
    fn from(value: Booking) -> Self {
        Self {
            id: value.id(),
            guest_id: *value.guest_id(),
            listing_id: value.listing_id(),
            check_in: value.stay().check_in(),
            check_out: value.stay().check_out(),
            guest_count: value.guest_count(),
            amount_due: value.amount_due(),
            status: value.status(),
            created_at: value.created_at(),
        }
    }
}

/// Request to admit and record a stay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub guest_id: UserId,
    pub listing_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guest_count: i32,
    pub amount_due: i64,
}

/// Response from admitting a stay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingResponse {
    pub booking: BookingPayload,
}

/// Request by the listing owner to confirm a guest checked out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmCheckoutRequest {
    pub owner_id: UserId,
    pub booking_id: Uuid,
}

/// Response from confirming a checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmCheckoutResponse {
    pub booking: BookingPayload,
}

/// Request by the guest to withdraw a still-`Booked` stay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveBookingRequest {
    pub guest_id: UserId,
    pub booking_id: Uuid,
}

/// Response from withdrawing a stay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveBookingResponse {
    pub booking_id: Uuid,
}

/// Driving port for booking write operations.
#[async_trait]
pub trait BookingCommand: Send + Sync {
    /// Admit the stay and record the booking in state `Booked`.
    ///
    /// Fails `InvalidRange` for inverted or past stays, `Conflict` when an
    /// existing booking for the same (guest, listing) overlaps the half-open
    /// range, and `Forbidden` for banned principals.
    async fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> Result<CreateBookingResponse, Error>;

    /// Move the booking `Booked → Finished` once the checkout date has
    /// passed.
    ///
    /// Fails `NotYetDue` before the checkout date, `Forbidden` when the
    /// caller does not own the listing, and `NotFound` when the booking is
    /// absent or already past `Booked` (repeat confirmations do not
    /// double-transition).
    async fn confirm_checkout(
        &self,
        request: ConfirmCheckoutRequest,
    ) -> Result<ConfirmCheckoutResponse, Error>;

    /// Hard-delete the guest's own booking while it is still `Booked`.
    async fn remove_booking(
        &self,
        request: RemoveBookingRequest,
    ) -> Result<RemoveBookingResponse, Error>;
}
