//! Review registry domain service.
//!
//! Enforces one review per (guest, listing) per finished stay and applies
//! the rating to the listing's running aggregate. The write side is one
//! atomic unit executed by the review repository: review insert, store-level
//! rating increment, and the booking's `Finished → Reviewed` transition
//! commit or roll back together, so the counters can never drift from the
//! review rows.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::warn;
use uuid::Uuid;

use crate::domain::cache_coherence::CacheCoherencer;
use crate::domain::ports::{
    BookingRepository, BookingRepositoryError, CacheKey, FileReviewRequest, FileReviewResponse,
    ListingRepository, ListingRepositoryError, ReadCache, ReviewCommand, ReviewRepository,
    ReviewRepositoryError, UserAccount, UserDirectory, UserDirectoryError,
};
use crate::domain::rating::RatingScore;
use crate::domain::review::{Review, ReviewDraft};
use crate::domain::{Error, UserId};

fn map_booking_error(error: BookingRepositoryError) -> Error {
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

fn map_review_error(error: ReviewRepositoryError) -> Error {
    match error {
        ReviewRepositoryError::Connection { message } => {
            Error::transient(format!("review store unavailable: {message}"))
        }
        ReviewRepositoryError::Query { message } => {
            Error::internal(format!("review store error: {message}"))
        }
        // A unique-index race on (author, listing): someone else committed
        // the same author's review between our precondition check and the
        // insert.
        ReviewRepositoryError::Duplicate { .. } => {
            Error::already_reviewed("you have already reviewed this listing")
        }
        // The entitling booking left Finished while we were filing.
        ReviewRepositoryError::StaleBooking { .. } => {
            Error::no_eligible_booking("your stay is no longer eligible for review")
        }
    }
}

/// Review registry implementing the review command driving port.
#[derive(Clone)]
pub struct ReviewRegistryService<B, L, R> {
    bookings: Arc<B>,
    listings: Arc<L>,
    reviews: Arc<R>,
    directory: Arc<dyn UserDirectory>,
    coherencer: CacheCoherencer,
    clock: Arc<dyn Clock>,
}

impl<B, L, R> ReviewRegistryService<B, L, R> {
    /// Create a registry over the three repositories and the external
    /// collaborators.
    pub fn new(
        bookings: Arc<B>,
        listings: Arc<L>,
        reviews: Arc<R>,
        directory: Arc<dyn UserDirectory>,
        cache: Arc<dyn ReadCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bookings,
            listings,
            reviews,
            directory,
            coherencer: CacheCoherencer::new(cache),
            clock,
        }
    }
}

impl<B, L, R> ReviewRegistryService<B, L, R>
where
    B: BookingRepository,
    L: ListingRepository,
    R: ReviewRepository,
{
    async fn require_active_account(&self, id: &UserId) -> Result<UserAccount, Error> {
        let account = self
            .directory
            .find_by_id(id)
            .await
            .map_err(map_directory_error)?
            .ok_or_else(|| Error::not_found(format!("guest {id} is not registered")))?;
        if account.banned {
            return Err(Error::forbidden(format!(
                "guest {id} is banned from the marketplace"
            )));
        }
        Ok(account)
    }

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
}

#[async_trait]
impl<B, L, R> ReviewCommand for ReviewRegistryService<B, L, R>
where
    B: BookingRepository,
    L: ListingRepository,
    R: ReviewRepository,
{
    async fn file_review(&self, request: FileReviewRequest) -> Result<FileReviewResponse, Error> {
        let author = self.require_active_account(&request.author_id).await?;

        let rating = RatingScore::new(request.rating)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let listing = self
            .listings
            .find_by_id(&request.listing_id)
            .await
            .map_err(map_listing_error)?
            .ok_or_else(|| Error::not_found(format!("listing {} not found", request.listing_id)))?;

        let booking = self
            .bookings
            .find_finished_for(&request.author_id, &request.listing_id)
            .await
            .map_err(map_booking_error)?
            .ok_or_else(|| {
                Error::no_eligible_booking("you have no finished stay for this listing")
            })?;

        if self
            .reviews
            .exists_for(&request.author_id, &request.listing_id)
            .await
            .map_err(map_review_error)?
        {
            return Err(Error::already_reviewed(
                "you have already reviewed this listing",
            ));
        }

        let review = Review::new(ReviewDraft {
            id: Uuid::new_v4(),
            author_id: request.author_id,
            listing_id: listing.id(),
            text: request.text,
            rating,
            reviewed_on: self.clock.utc().date_naive(),
        })
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        let aggregate = self
            .reviews
            .file_review(&review, &booking.id())
            .await
            .map_err(map_review_error)?;

        let mut keys = vec![
            CacheKey::listing_detail(listing.id()),
            CacheKey::listing_reviews(listing.id()),
            CacheKey::guest_bookings(&author.username),
        ];
        if let Some(owner_username) = self.username_for(listing.owner_id()).await {
            keys.push(CacheKey::owner_reservations(&owner_username));
        }
        self.coherencer.invalidate(&keys).await;

        Ok(FileReviewResponse {
            review: review.into(),
            listing_rating: aggregate.displayed(),
        })
    }
}

#[cfg(test)]
#[path = "review_registry_tests.rs"]
mod tests;
