//! Delete-on-write invalidation of cached read views.
//!
//! After each committed mutation, and before the response returns to the
//! caller, the affected cache keys are deleted so the next read repopulates
//! from the ledger. The invalidate-then-recompute window is not transactional
//! with the commit: a racing read may repopulate an entry that is already
//! stale. That residual window is an accepted part of the consistency model
//! and is bounded by the entry TTLs below, not a bug to fix here.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::domain::ports::{CacheKey, ReadCache};

/// Default time-to-live for cached read views.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

/// Time-to-live for owner reservation lists, which change far more often
/// than the other views.
pub const OWNER_RESERVATIONS_TTL: Duration = Duration::from_secs(30);

/// Invalidates the read views affected by a committed mutation.
#[derive(Clone)]
pub struct CacheCoherencer {
    cache: Arc<dyn ReadCache>,
}

impl CacheCoherencer {
    /// Create a coherencer over the shared read cache.
    pub fn new(cache: Arc<dyn ReadCache>) -> Self {
        Self { cache }
    }

    /// Delete every key in the set.
    ///
    /// Cache failures never fail the surrounding mutation: each failed
    /// delete is logged and the entry is left to age out via its TTL.
    pub async fn invalidate(&self, keys: &[CacheKey]) {
        for key in keys {
            if let Err(error) = self.cache.delete(key).await {
                warn!(key = %key, %error, "cache invalidation failed; entry ages out via TTL");
            }
        }
    }
}
