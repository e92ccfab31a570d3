//! Driving port for the cached booking read views.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Error, UserId};

use super::BookingPayload;

/// Request for a guest's booking list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGuestBookingsRequest {
    pub guest_id: UserId,
}

/// A guest's not-yet-reviewed bookings, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGuestBookingsResponse {
    pub bookings: Vec<BookingPayload>,
}

/// Request for an owner's reservation management list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOwnerReservationsRequest {
    pub owner_id: UserId,
}

/// All bookings across the owner's listings, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOwnerReservationsResponse {
    pub reservations: Vec<BookingPayload>,
}

/// Driving port for booking read operations.
///
/// Both reads are cache-aside over the shared read cache; see the service
/// documentation for the TTL policy and the accepted staleness window.
#[async_trait]
pub trait BookingQuery: Send + Sync {
    /// The guest's bookings that still await checkout or review.
    async fn list_guest_bookings(
        &self,
        request: ListGuestBookingsRequest,
    ) -> Result<ListGuestBookingsResponse, Error>;

    /// Every booking on the owner's listings.
    async fn list_owner_reservations(
        &self,
        request: ListOwnerReservationsRequest,
    ) -> Result<ListOwnerReservationsResponse, Error>;
}
