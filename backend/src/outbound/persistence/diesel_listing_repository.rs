//! PostgreSQL-backed `ListingRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ListingRepository, ListingRepositoryError};
use crate::domain::{Listing, ListingDraft, RateUnit, RatingAggregate, UserId};

use super::diesel_error_map::{map_diesel_error_with, map_pool_error_with};
use super::models::ListingRow;
use super::pool::{DbPool, PoolError};
use super::schema::listings;

/// Diesel-backed implementation of the listing repository port.
#[derive(Clone)]
pub struct DieselListingRepository {
    pool: DbPool,
}

impl DieselListingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ListingRepositoryError {
    map_pool_error_with(error, ListingRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ListingRepositoryError {
    map_diesel_error_with(
        error,
        ListingRepositoryError::query,
        ListingRepositoryError::connection,
    )
}

/// Convert a database row into a validated domain listing.
fn row_to_listing(row: ListingRow) -> Result<Listing, ListingRepositoryError> {
    let ListingRow {
        id,
        owner_id,
        name,
        price,
        rate_unit,
        rating_sum,
        rating_count,
        created_at: _,
    } = row;

    let rate_unit: RateUnit = rate_unit
        .parse()
        .map_err(|err: crate::domain::ListingValidationError| {
            ListingRepositoryError::query(err.to_string())
        })?;
    let rating = RatingAggregate::new(rating_sum, rating_count)
        .map_err(|err| ListingRepositoryError::query(err.to_string()))?;

    Listing::new(ListingDraft {
        id,
        owner_id: UserId::from_uuid(owner_id),
        name,
        price,
        rate_unit,
        rating,
    })
    .map_err(|err| ListingRepositoryError::query(err.to_string()))
}

#[async_trait]
impl ListingRepository for DieselListingRepository {
    async fn find_by_id(
        &self,
        listing_id: &Uuid,
    ) -> Result<Option<Listing>, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = listings::table
            .filter(listings::id.eq(listing_id))
            .select(ListingRow::as_select())
            .first::<ListingRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_listing).transpose()
    }
}
