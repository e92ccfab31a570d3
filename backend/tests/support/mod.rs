//! Shared in-memory doubles for driving the reservation services end to end.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use uuid::Uuid;

use backend::domain::ports::{
    AdmissionOutcome, BookingRepository, BookingRepositoryError, CacheKey, ListingRepository,
    ListingRepositoryError, NotificationMessage, Notifier, NotifierError, ReadCache,
    ReadCacheError, ReviewRepository, ReviewRepositoryError, UserAccount, UserDirectory,
    UserDirectoryError,
};
use backend::domain::{
    Booking, BookingStatus, Listing, ListingDraft, RatingAggregate, Review, StayRange, UserId,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("test double mutex poisoned"),
    }
}

/// Clock whose time the test advances explicitly.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_days(&self, days: i64) {
        *lock(&self.0) += TimeDelta::days(days);
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *lock(&self.0) = now;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0)
    }
}

/// Shared backing state for the in-memory repositories.
#[derive(Default)]
pub struct SharedStore {
    bookings: Mutex<Vec<Booking>>,
    listings: Mutex<HashMap<Uuid, Listing>>,
    reviews: Mutex<Vec<Review>>,
}

impl SharedStore {
    pub fn insert_listing(&self, listing: Listing) {
        lock(&self.listings).insert(listing.id(), listing);
    }

    pub fn listing(&self, listing_id: Uuid) -> Option<Listing> {
        lock(&self.listings).get(&listing_id).cloned()
    }

    pub fn booking(&self, booking_id: Uuid) -> Option<Booking> {
        lock(&self.bookings)
            .iter()
            .find(|booking| booking.id() == booking_id)
            .cloned()
    }

    pub fn review_count(&self) -> usize {
        lock(&self.reviews).len()
    }
}

/// In-memory booking repository; the store mutex stands in for the admission
/// transaction.
#[derive(Clone)]
pub struct InMemoryBookings {
    store: Arc<SharedStore>,
}

impl InMemoryBookings {
    pub fn new(store: Arc<SharedStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookings {
    async fn has_overlap(
        &self,
        guest_id: &UserId,
        listing_id: &Uuid,
        stay: &StayRange,
    ) -> Result<bool, BookingRepositoryError> {
        Ok(lock(&self.store.bookings).iter().any(|existing| {
            existing.guest_id() == guest_id
                && existing.listing_id() == *listing_id
                && existing.stay().overlaps(stay)
        }))
    }

    async fn insert_if_vacant(
        &self,
        booking: &Booking,
    ) -> Result<AdmissionOutcome, BookingRepositoryError> {
        let mut bookings = lock(&self.store.bookings);
        let overlapping = bookings.iter().any(|existing| {
            existing.guest_id() == booking.guest_id()
                && existing.listing_id() == booking.listing_id()
                && existing.stay().overlaps(booking.stay())
        });
        if overlapping {
            return Ok(AdmissionOutcome::Overlapping);
        }
        bookings.push(booking.clone());
        Ok(AdmissionOutcome::Created)
    }

    async fn find_by_id(
        &self,
        booking_id: &Uuid,
    ) -> Result<Option<Booking>, BookingRepositoryError> {
        Ok(self.store.booking(*booking_id))
    }

    async fn transition_status(
        &self,
        booking_id: &Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<bool, BookingRepositoryError> {
        let mut bookings = lock(&self.store.bookings);
        let Some(slot) = bookings
            .iter_mut()
            .find(|existing| existing.id() == *booking_id && existing.status() == from)
        else {
            return Ok(false);
        };
        *slot = slot
            .clone()
            .transitioned(to)
            .map_err(|err| BookingRepositoryError::query(err.to_string()))?;
        Ok(true)
    }

    async fn delete_if_booked(
        &self,
        booking_id: &Uuid,
        guest_id: &UserId,
    ) -> Result<bool, BookingRepositoryError> {
        let mut bookings = lock(&self.store.bookings);
        let before = bookings.len();
        bookings.retain(|existing| {
            !(existing.id() == *booking_id
                && existing.guest_id() == guest_id
                && existing.status() == BookingStatus::Booked)
        });
        Ok(bookings.len() < before)
    }

    async fn find_finished_for(
        &self,
        guest_id: &UserId,
        listing_id: &Uuid,
    ) -> Result<Option<Booking>, BookingRepositoryError> {
        let bookings = lock(&self.store.bookings);
        let mut finished: Vec<&Booking> = bookings
            .iter()
            .filter(|existing| {
                existing.guest_id() == guest_id
                    && existing.listing_id() == *listing_id
                    && existing.status() == BookingStatus::Finished
            })
            .collect();
        finished.sort_by_key(|existing| existing.stay().check_out());
        Ok(finished.first().map(|existing| (*existing).clone()))
    }

    async fn list_active_for_guest(
        &self,
        guest_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let mut active: Vec<Booking> = lock(&self.store.bookings)
            .iter()
            .filter(|existing| {
                existing.guest_id() == guest_id && existing.status() != BookingStatus::Reviewed
            })
            .cloned()
            .collect();
        active.sort_by_key(|existing| std::cmp::Reverse(existing.created_at()));
        Ok(active)
    }

    async fn list_for_owner(
        &self,
        owner_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let listings = lock(&self.store.listings);
        let owned: Vec<Uuid> = listings
            .values()
            .filter(|listing| listing.owner_id() == owner_id)
            .map(Listing::id)
            .collect();
        drop(listings);

        let mut reservations: Vec<Booking> = lock(&self.store.bookings)
            .iter()
            .filter(|existing| owned.contains(&existing.listing_id()))
            .cloned()
            .collect();
        reservations.sort_by_key(|existing| std::cmp::Reverse(existing.created_at()));
        Ok(reservations)
    }
}

/// In-memory listing repository.
#[derive(Clone)]
pub struct InMemoryListings {
    store: Arc<SharedStore>,
}

impl InMemoryListings {
    pub fn new(store: Arc<SharedStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ListingRepository for InMemoryListings {
    async fn find_by_id(
        &self,
        listing_id: &Uuid,
    ) -> Result<Option<Listing>, ListingRepositoryError> {
        Ok(self.store.listing(*listing_id))
    }
}

/// In-memory review repository mirroring the single-transaction filing
/// semantics of the Diesel adapter.
#[derive(Clone)]
pub struct InMemoryReviews {
    store: Arc<SharedStore>,
}

impl InMemoryReviews {
    pub fn new(store: Arc<SharedStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ReviewRepository for InMemoryReviews {
    async fn exists_for(
        &self,
        author_id: &UserId,
        listing_id: &Uuid,
    ) -> Result<bool, ReviewRepositoryError> {
        Ok(lock(&self.store.reviews).iter().any(|existing| {
            existing.author_id() == author_id && existing.listing_id() == *listing_id
        }))
    }

    async fn file_review(
        &self,
        review: &Review,
        booking_id: &Uuid,
    ) -> Result<RatingAggregate, ReviewRepositoryError> {
        let mut bookings = lock(&self.store.bookings);
        let mut listings = lock(&self.store.listings);
        let mut reviews = lock(&self.store.reviews);

        let duplicate = reviews.iter().any(|existing| {
            existing.author_id() == review.author_id()
                && existing.listing_id() == review.listing_id()
        });
        if duplicate {
            return Err(ReviewRepositoryError::duplicate(
                "review already exists for this (author, listing)",
            ));
        }

        let Some(slot) = bookings
            .iter_mut()
            .find(|existing| {
                existing.id() == *booking_id && existing.status() == BookingStatus::Finished
            })
        else {
            return Err(ReviewRepositoryError::stale_booking(
                "booking is not in the Finished state",
            ));
        };

        let listing = listings
            .get(&review.listing_id())
            .cloned()
            .ok_or_else(|| ReviewRepositoryError::query("listing vanished"))?;
        let rating = listing.rating().apply(review.rating());
        let updated = Listing::new(ListingDraft {
            id: listing.id(),
            owner_id: *listing.owner_id(),
            name: listing.name().to_owned(),
            price: listing.price(),
            rate_unit: listing.rate_unit(),
            rating,
        })
        .map_err(|err| ReviewRepositoryError::query(err.to_string()))?;

        *slot = slot
            .clone()
            .transitioned(BookingStatus::Reviewed)
            .map_err(|err| ReviewRepositoryError::query(err.to_string()))?;
        listings.insert(updated.id(), updated);
        reviews.push(review.clone());
        Ok(rating)
    }
}

/// Directory double with mutable accounts.
#[derive(Default)]
pub struct InMemoryDirectory {
    accounts: Mutex<HashMap<UserId, UserAccount>>,
}

impl InMemoryDirectory {
    pub fn with_accounts(accounts: impl IntoIterator<Item = UserAccount>) -> Self {
        let directory = Self::default();
        {
            let mut slots = lock(&directory.accounts);
            for account in accounts {
                slots.insert(account.id, account);
            }
        }
        directory
    }

    pub fn insert(&self, account: UserAccount) {
        lock(&self.accounts).insert(account.id, account);
    }

    pub fn ban(&self, id: &UserId) {
        if let Some(account) = lock(&self.accounts).get_mut(id) {
            account.banned = true;
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserDirectoryError> {
        Ok(lock(&self.accounts).get(id).cloned())
    }
}

/// Recording notifier double.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<NotificationMessage>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<NotificationMessage> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: NotificationMessage) -> Result<(), NotifierError> {
        lock(&self.sent).push(message);
        Ok(())
    }
}

/// Recording cache double: a real key/value map plus put/delete journals.
#[derive(Default)]
pub struct RecordingCache {
    entries: Mutex<HashMap<String, serde_json::Value>>,
    puts: Mutex<Vec<(String, Duration)>>,
    deletes: Mutex<Vec<String>>,
}

impl RecordingCache {
    pub fn deleted_keys(&self) -> Vec<String> {
        lock(&self.deletes).clone()
    }

    pub fn puts(&self) -> Vec<(String, Duration)> {
        lock(&self.puts).clone()
    }

    pub fn contains(&self, key: &str) -> bool {
        lock(&self.entries).contains_key(key)
    }
}

#[async_trait]
impl ReadCache for RecordingCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<serde_json::Value>, ReadCacheError> {
        Ok(lock(&self.entries).get(key.as_str()).cloned())
    }

    async fn put(
        &self,
        key: &CacheKey,
        value: &serde_json::Value,
        ttl: Duration,
    ) -> Result<(), ReadCacheError> {
        lock(&self.entries).insert(key.as_str().to_owned(), value.clone());
        lock(&self.puts).push((key.as_str().to_owned(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<(), ReadCacheError> {
        lock(&self.entries).remove(key.as_str());
        lock(&self.deletes).push(key.as_str().to_owned());
        Ok(())
    }
}
