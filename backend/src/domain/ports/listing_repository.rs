//! Port for listing reads.
//!
//! The rating counters on a listing are written exclusively through the
//! review filing transaction on
//! [`ReviewRepository`](super::ReviewRepository); this port stays read-only.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Listing;

use super::define_port_error;

define_port_error! {
    /// Errors raised by listing repository adapters.
    pub enum ListingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "listing repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "listing repository query failed: {message}",
    }
}

/// Port for reading listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Find a listing by id.
    async fn find_by_id(
        &self,
        listing_id: &Uuid,
    ) -> Result<Option<Listing>, ListingRepositoryError>;
}

/// Fixture repository for tests that do not exercise listing reads.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureListingRepository;

#[async_trait]
impl ListingRepository for FixtureListingRepository {
    async fn find_by_id(
        &self,
        _listing_id: &Uuid,
    ) -> Result<Option<Listing>, ListingRepositoryError> {
        Ok(None)
    }
}
