//! Port for review persistence and the atomic filing unit.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{RatingAggregate, Review, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by review repository adapters.
    pub enum ReviewRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "review repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "review repository query failed: {message}",
        /// A review by this author for this listing already exists.
        Duplicate { message: String } =>
            "review already exists: {message}",
        /// The booking to transition was no longer in `Finished`.
        StaleBooking { message: String } =>
            "booking not eligible for review transition: {message}",
    }
}

/// Port for review reads and the transactional filing write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Whether the author already reviewed the listing.
    async fn exists_for(
        &self,
        author_id: &UserId,
        listing_id: &Uuid,
    ) -> Result<bool, ReviewRepositoryError>;

    /// File the review as one atomic unit: insert the review row, apply its
    /// score to the listing's rating counters as a store-level atomic
    /// increment, and move the entitling booking `Finished → Reviewed`.
    ///
    /// All three effects commit together or roll back together. Returns the
    /// listing's rating counters as of the commit. A lost uniqueness race on
    /// (author, listing) surfaces as [`ReviewRepositoryError::Duplicate`];
    /// a booking that concurrently left `Finished` surfaces as
    /// [`ReviewRepositoryError::StaleBooking`].
    async fn file_review(
        &self,
        review: &Review,
        booking_id: &Uuid,
    ) -> Result<RatingAggregate, ReviewRepositoryError>;
}

/// Fixture repository for tests that do not exercise review persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReviewRepository;

#[async_trait]
impl ReviewRepository for FixtureReviewRepository {
    async fn exists_for(
        &self,
        _author_id: &UserId,
        _listing_id: &Uuid,
    ) -> Result<bool, ReviewRepositoryError> {
        Ok(false)
    }

    async fn file_review(
        &self,
        review: &Review,
        _booking_id: &Uuid,
    ) -> Result<RatingAggregate, ReviewRepositoryError> {
        Ok(RatingAggregate::zero().apply(review.rating()))
    }
}
