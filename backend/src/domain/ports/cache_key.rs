//! Cache keys for the read views the reservation core keeps coherent.
//!
//! Key texts mirror the store layout consumed by the read endpoints:
//! per-principal lists are keyed by username, listing-scoped views by
//! listing id. The four families here are exactly the ones the coherence
//! table in the service layer invalidates.

use thiserror::Error;
use uuid::Uuid;

/// Opaque key into the shared read cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Construct a key after validating that it is non-empty and trimmed.
    pub fn new(value: impl Into<String>) -> Result<Self, CacheKeyValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(CacheKeyValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(CacheKeyValidationError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }

    /// Key of a guest's booking list view.
    pub fn guest_bookings(username: &str) -> Self {
        Self(format!("user_bookings_{}", username.trim()))
    }

    /// Key of a listing owner's reservation management view.
    pub fn owner_reservations(username: &str) -> Self {
        Self(format!("my_housing_reservations_{}", username.trim()))
    }

    /// Key of a listing's detail view.
    pub fn listing_detail(listing_id: Uuid) -> Self {
        Self(format!("housing_{listing_id}"))
    }

    /// Key of a listing's review list view.
    pub fn listing_reviews(listing_id: Uuid) -> Self {
        Self(format!("review_{listing_id}"))
    }

    /// Borrow the underlying key text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validation errors returned when constructing [`CacheKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheKeyValidationError {
    /// Key is empty after trimming whitespace.
    #[error("cache key must not be empty")]
    Empty,
    /// Key contains leading or trailing whitespace.
    #[error("cache key must not contain surrounding whitespace")]
    ContainsWhitespace,
}
