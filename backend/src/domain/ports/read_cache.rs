//! Port for the shared TTL key/value read cache.
//!
//! The cache is an external collaborator and explicitly not strongly
//! consistent with the durable store: a read racing a concurrent write may
//! repopulate an entry that is immediately stale. That window is accepted
//! and bounded by the entry TTL; callers must treat every cache failure as
//! best-effort and never let it fail the surrounding mutation.

use std::time::Duration;

use async_trait::async_trait;

use super::{define_port_error, CacheKey};

define_port_error! {
    /// Errors surfaced by read cache adapters.
    pub enum ReadCacheError {
        /// Cache backend is unavailable or timing out.
        Backend { message: String } => "read cache backend failure: {message}",
        /// Serialisation or deserialisation of a cached value failed.
        Serialization { message: String } => "read cache serialisation failed: {message}",
    }
}

/// Port for reading, populating and invalidating cached view payloads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadCache: Send + Sync {
    /// Read the cached payload for the given key.
    async fn get(&self, key: &CacheKey) -> Result<Option<serde_json::Value>, ReadCacheError>;

    /// Store a payload under the key with the supplied time-to-live.
    async fn put(
        &self,
        key: &CacheKey,
        value: &serde_json::Value,
        ttl: Duration,
    ) -> Result<(), ReadCacheError>;

    /// Drop the entry for the key, if any.
    async fn delete(&self, key: &CacheKey) -> Result<(), ReadCacheError>;
}

/// Fixture implementation for tests that do not exercise caching: always
/// misses and discards writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReadCache;

#[async_trait]
impl ReadCache for FixtureReadCache {
    async fn get(&self, _key: &CacheKey) -> Result<Option<serde_json::Value>, ReadCacheError> {
        Ok(None)
    }

    async fn put(
        &self,
        _key: &CacheKey,
        _value: &serde_json::Value,
        _ttl: Duration,
    ) -> Result<(), ReadCacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &CacheKey) -> Result<(), ReadCacheError> {
        Ok(())
    }
}
