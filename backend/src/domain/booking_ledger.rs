//! Booking ledger domain service.
//!
//! Owns booking creation, checkout confirmation, withdrawal and the cached
//! booking read views. Creation delegates admission to
//! [`AvailabilityChecker`] and relies on the repository's atomic
//! check-then-insert so two concurrent requests for the same
//! (guest, listing) pair cannot both succeed.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use tracing::warn;
use uuid::Uuid;

use crate::domain::availability::AvailabilityChecker;
use crate::domain::cache_coherence::{
    CacheCoherencer, DEFAULT_CACHE_TTL, OWNER_RESERVATIONS_TTL,
};
use crate::domain::ports::{
    AdmissionOutcome, BookingCommand, BookingPayload, BookingQuery, BookingRepository,
    BookingRepositoryError, CacheKey, ConfirmCheckoutRequest, ConfirmCheckoutResponse,
    CreateBookingRequest, CreateBookingResponse, ListGuestBookingsRequest,
    ListGuestBookingsResponse, ListOwnerReservationsRequest, ListOwnerReservationsResponse,
    ListingRepository, ListingRepositoryError, NotificationMessage, Notifier, ReadCache,
    RemoveBookingRequest, RemoveBookingResponse, UserAccount, UserDirectory, UserDirectoryError,
};
use crate::domain::{Booking, BookingDraft, BookingStatus, Error, StayRange, UserId};

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

fn map_listing_error(error: ListingRepositoryError) -> Error {
    match error {
        ListingRepositoryError::Connection { message } => {
            Error::transient(format!("listing store unavailable: {message}"))
        }
        ListingRepositoryError::Query { message } => {
            Error::internal(format!("listing store error: {message}"))
        }
    }
}

fn map_directory_error(error: UserDirectoryError) -> Error {
    match error {
        UserDirectoryError::Connection { message } => {
            Error::transient(format!("user directory unavailable: {message}"))
        }
        UserDirectoryError::Query { message } => {
            Error::internal(format!("user directory error: {message}"))
        }
    }
}

/// Booking ledger implementing the booking command and query driving ports.
#[derive(Clone)]
pub struct BookingLedgerService<B, L> {
    bookings: Arc<B>,
    listings: Arc<L>,
    directory: Arc<dyn UserDirectory>,
    notifier: Arc<dyn Notifier>,
    cache: Arc<dyn ReadCache>,
    coherencer: CacheCoherencer,
    availability: AvailabilityChecker<B>,
    clock: Arc<dyn Clock>,
}

impl<B, L> BookingLedgerService<B, L> {
    /// Create a ledger over the booking and listing repositories and the
    /// external collaborators.
    pub fn new(
        bookings: Arc<B>,
        listings: Arc<L>,
        directory: Arc<dyn UserDirectory>,
        notifier: Arc<dyn Notifier>,
        cache: Arc<dyn ReadCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let coherencer = CacheCoherencer::new(cache.clone());
        let availability = AvailabilityChecker::new(bookings.clone(), clock.clone());
        Self {
            bookings,
            listings,
            directory,
            notifier,
            cache,
            coherencer,
            availability,
            clock,
        }
    }
}

impl<B, L> BookingLedgerService<B, L>
where
    B: BookingRepository,
    L: ListingRepository,
{
    async fn require_active_account(
        &self,
        id: &UserId,
        role: &str,
    ) -> Result<UserAccount, Error> {
        let account = self
            .directory
            .find_by_id(id)
            .await
            .map_err(map_directory_error)?
            .ok_or_else(|| Error::not_found(format!("{role} {id} is not registered")))?;
        if account.banned {
            return Err(Error::forbidden(format!(
                "{role} {id} is banned from the marketplace"
            )));
        }
        Ok(account)
    }

    /// Best-effort username lookup for building cache keys after a commit.
    /// A directory failure here must not fail the mutation; the affected
    /// entry then simply ages out via its TTL.
    async fn username_for(&self, id: &UserId) -> Option<String> {
        match self.directory.find_by_id(id).await {
            Ok(Some(account)) => Some(account.username),
            Ok(None) => None,
            Err(error) => {
                warn!(user = %id, %error, "directory lookup failed during cache invalidation");
                None
            }
        }
    }

    async fn dispatch(&self, message: NotificationMessage) {
        // At-most-once: failures are logged, never retried or propagated.
        if let Err(error) = self.notifier.send(message).await {
            warn!(%error, "notification dropped");
        }
    }

    async fn read_cached(&self, key: &CacheKey) -> Option<Vec<BookingPayload>> {
        match self.cache.get(key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(payloads) => Some(payloads),
                Err(error) => {
                    warn!(key = %key, %error, "discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(error) => {
                warn!(key = %key, %error, "read cache unavailable; reading from the ledger");
                None
            }
        }
    }

    async fn write_cached(&self, key: &CacheKey, payloads: &[BookingPayload], ttl: Duration) {
        let value = match serde_json::to_value(payloads) {
            Ok(value) => value,
            Err(error) => {
                warn!(key = %key, %error, "failed to serialise payloads for the read cache");
                return;
            }
        };
        if let Err(error) = self.cache.put(key, &value, ttl).await {
            warn!(key = %key, %error, "failed to populate read cache");
        }
    }
}

#[async_trait]
impl<B, L> BookingCommand for BookingLedgerService<B, L>
where
    B: BookingRepository,
    L: ListingRepository,
{
    async fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> Result<CreateBookingResponse, Error> {
        let guest = self.require_active_account(&request.guest_id, "guest").await?;

        let stay = StayRange::new(request.check_in, request.check_out)
            .map_err(|err| Error::invalid_range(err.to_string()))?;

        self.availability
            .check(&request.guest_id, &request.listing_id, &stay)
            .await?;

        let listing = self
            .listings
            .find_by_id(&request.listing_id)
            .await
            .map_err(map_listing_error)?
            .ok_or_else(|| Error::not_found(format!("listing {} not found", request.listing_id)))?;

        let booking = Booking::new(BookingDraft {
            id: Uuid::new_v4(),
            guest_id: request.guest_id,
            listing_id: listing.id(),
            stay,
            guest_count: request.guest_count,
            amount_due: request.amount_due,
            status: BookingStatus::Booked,
            created_at: self.clock.utc(),
        })
        .map_err(|err| Error::invalid_request(format!("invalid booking request: {err}")))?;

        // The pre-check above is advisory; this insert re-checks inside one
        // transaction and is the admission decision of record.
        match self
            .bookings
            .insert_if_vacant(&booking)
            .await
            .map_err(map_repository_error)?
        {
            AdmissionOutcome::Created => {}
            AdmissionOutcome::Overlapping => {
                return Err(Error::conflict(
                    "an existing booking for this listing overlaps the requested stay",
                ));
            }
        }

        self.coherencer
            .invalidate(&[CacheKey::guest_bookings(&guest.username)])
            .await;
        self.dispatch(NotificationMessage::BookingCreated {
            guest_id: *booking.guest_id(),
            booking_id: booking.id(),
        })
        .await;

        Ok(CreateBookingResponse {
            booking: booking.into(),
        })
    }

    async fn confirm_checkout(
        &self,
        request: ConfirmCheckoutRequest,
    ) -> Result<ConfirmCheckoutResponse, Error> {
        let owner = self.require_active_account(&request.owner_id, "owner").await?;

        let booking = self
            .bookings
            .find_by_id(&request.booking_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("booking {} not found", request.booking_id)))?;

        let listing = self
            .listings
            .find_by_id(&booking.listing_id())
            .await
            .map_err(map_listing_error)?
            .ok_or_else(|| {
                Error::not_found(format!("listing {} not found", booking.listing_id()))
            })?;
        if listing.owner_id() != &request.owner_id {
            return Err(Error::forbidden(
                "only the listing owner can confirm a checkout",
            ));
        }

        let today = self.clock.utc().date_naive();
        if today < booking.stay().check_out() {
            return Err(Error::not_yet_due("guests are not checking out yet"));
        }

        // Compare-and-set: a repeat confirmation, or a lost race against a
        // concurrent one, finds no Booked row and fails instead of moving
        // Finished to Finished.
        let moved = self
            .bookings
            .transition_status(
                &request.booking_id,
                BookingStatus::Booked,
                BookingStatus::Finished,
            )
            .await
            .map_err(map_repository_error)?;
        if !moved {
            return Err(Error::not_found(
                "no booking awaiting checkout confirmation",
            ));
        }

        let booking = booking
            .transitioned(BookingStatus::Finished)
            .map_err(|err| Error::internal(format!("booking state diverged: {err}")))?;

        self.dispatch(NotificationMessage::StayFinished {
            guest_id: *booking.guest_id(),
            booking_id: booking.id(),
        })
        .await;

        let mut keys = vec![CacheKey::owner_reservations(&owner.username)];
        if let Some(guest_username) = self.username_for(booking.guest_id()).await {
            keys.push(CacheKey::guest_bookings(&guest_username));
        }
        self.coherencer.invalidate(&keys).await;

        Ok(ConfirmCheckoutResponse {
            booking: booking.into(),
        })
    }

    async fn remove_booking(
        &self,
        request: RemoveBookingRequest,
    ) -> Result<RemoveBookingResponse, Error> {
        let guest = self.require_active_account(&request.guest_id, "guest").await?;

        let removed = self
            .bookings
            .delete_if_booked(&request.booking_id, &request.guest_id)
            .await
            .map_err(map_repository_error)?;
        if !removed {
            return Err(Error::not_found(
                "booking does not exist, is not yours, or is no longer removable",
            ));
        }

        self.coherencer
            .invalidate(&[CacheKey::guest_bookings(&guest.username)])
            .await;

        Ok(RemoveBookingResponse {
            booking_id: request.booking_id,
        })
    }
}

#[async_trait]
impl<B, L> BookingQuery for BookingLedgerService<B, L>
where
    B: BookingRepository,
    L: ListingRepository,
{
    async fn list_guest_bookings(
        &self,
        request: ListGuestBookingsRequest,
    ) -> Result<ListGuestBookingsResponse, Error> {
        let guest = self.require_active_account(&request.guest_id, "guest").await?;
        let key = CacheKey::guest_bookings(&guest.username);

        if let Some(bookings) = self.read_cached(&key).await {
            return Ok(ListGuestBookingsResponse { bookings });
        }

        let bookings: Vec<BookingPayload> = self
            .bookings
            .list_active_for_guest(&request.guest_id)
            .await
            .map_err(map_repository_error)?
            .into_iter()
            .map(Into::into)
            .collect();

        self.write_cached(&key, &bookings, DEFAULT_CACHE_TTL).await;
        Ok(ListGuestBookingsResponse { bookings })
    }

    async fn list_owner_reservations(
        &self,
        request: ListOwnerReservationsRequest,
    ) -> Result<ListOwnerReservationsResponse, Error> {
        let owner = self.require_active_account(&request.owner_id, "owner").await?;
        let key = CacheKey::owner_reservations(&owner.username);

        if let Some(reservations) = self.read_cached(&key).await {
            return Ok(ListOwnerReservationsResponse { reservations });
        }

        let reservations: Vec<BookingPayload> = self
            .bookings
            .list_for_owner(&request.owner_id)
            .await
            .map_err(map_repository_error)?
            .into_iter()
            .map(Into::into)
            .collect();

        self.write_cached(&key, &reservations, OWNER_RESERVATIONS_TTL)
            .await;
        Ok(ListOwnerReservationsResponse { reservations })
    }
}

#[cfg(test)]
#[path = "booking_ledger_tests.rs"]
mod tests;
