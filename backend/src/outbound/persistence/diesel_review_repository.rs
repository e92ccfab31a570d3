//! PostgreSQL-backed `ReviewRepository` implementation using Diesel ORM.
//!
//! Filing a review is one transaction: the review insert, the rating counter
//! bump and the booking's `Finished → Reviewed` step commit together. The
//! counter bump is expressed as `rating_sum = rating_sum + $score` so the
//! store applies it atomically; concurrent reviews on a popular listing
//! serialise on the row without a read-modify-write race in application
//! code.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ReviewRepository, ReviewRepositoryError};
use crate::domain::{BookingStatus, RatingAggregate, Review, UserId};

use super::diesel_error_map::{is_unique_violation, map_diesel_error_with, map_pool_error_with};
use super::models::NewReviewRow;
use super::pool::{DbPool, PoolError};
use super::schema::{bookings, listings, reviews};

/// Diesel-backed implementation of the review repository port.
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReviewRepositoryError {
    map_pool_error_with(error, ReviewRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ReviewRepositoryError {
    map_diesel_error_with(
        error,
        ReviewRepositoryError::query,
        ReviewRepositoryError::connection,
    )
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn exists_for(
        &self,
        author_id: &UserId,
        listing_id: &Uuid,
    ) -> Result<bool, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let existing: i64 = reviews::table
            .filter(reviews::author_id.eq(author_id.as_uuid()))
            .filter(reviews::listing_id.eq(listing_id))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(existing > 0)
    }

    async fn file_review(
        &self,
        review: &Review,
        booking_id: &Uuid,
    ) -> Result<RatingAggregate, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewReviewRow {
            id: review.id(),
            author_id: *review.author_id().as_uuid(),
            listing_id: review.listing_id(),
            rating: review.rating().value(),
            text: review.text(),
            reviewed_on: review.reviewed_on(),
        };
        let score = i64::from(review.rating().value());
        let listing_id = review.listing_id();
        let booking_id = *booking_id;

        let result = conn
            .transaction::<(i64, i64), diesel::result::Error, _>(|conn| {
                async move {
                    diesel::insert_into(reviews::table)
                        .values(&row)
                        .execute(conn)
                        .await?;

                    let counters = diesel::update(
                        listings::table.filter(listings::id.eq(listing_id)),
                    )
                    .set((
                        listings::rating_sum.eq(listings::rating_sum + score),
                        listings::rating_count.eq(listings::rating_count + 1),
                    ))
                    .returning((listings::rating_sum, listings::rating_count))
                    .get_result::<(i64, i64)>(conn)
                    .await?;

                    let moved = diesel::update(
                        bookings::table
                            .filter(bookings::id.eq(booking_id))
                            .filter(bookings::status.eq(BookingStatus::Finished.as_str())),
                    )
                    .set(bookings::status.eq(BookingStatus::Reviewed.as_str()))
                    .execute(conn)
                    .await?;

                    if moved == 0 {
                        // Roll the review insert and the counter bump back:
                        // the entitling booking left Finished underneath us.
                        return Err(diesel::result::Error::RollbackTransaction);
                    }

                    Ok(counters)
                }
                .scope_boxed()
            })
            .await;

        match result {
            Ok((sum, count)) => RatingAggregate::new(sum, count)
                .map_err(|err| ReviewRepositoryError::query(err.to_string())),
            Err(error) if is_unique_violation(&error) => Err(ReviewRepositoryError::duplicate(
                "a review by this author for this listing already exists",
            )),
            Err(diesel::result::Error::RollbackTransaction) => {
                Err(ReviewRepositoryError::stale_booking(
                    "booking is no longer in the Finished state",
                ))
            }
            Err(error) => Err(map_diesel_error(error)),
        }
    }
}
