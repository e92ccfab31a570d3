//! Redis-backed read cache adapter.
//!
//! Implements the `ReadCache` port over `bb8-redis`: JSON payloads under
//! namespaced keys, per-put TTLs with a small random jitter so entries
//! written in a burst do not all expire on the same second.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::redis::AsyncCommands;
use bb8_redis::{bb8, RedisConnectionManager};
use rand::Rng;

use crate::domain::ports::{CacheKey, ReadCache, ReadCacheError};

/// Configuration for the Redis read cache.
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    url: String,
    namespace: String,
    max_size: u32,
    max_ttl_jitter: Duration,
}

impl RedisCacheConfig {
    /// Create a new configuration with the given Redis URL.
    ///
    /// Defaults: `marketplace` key namespace, 8 pooled connections, up to
    /// 15 seconds of TTL jitter.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            namespace: "marketplace".to_owned(),
            max_size: 8,
            max_ttl_jitter: Duration::from_secs(15),
        }
    }

    /// Set the key namespace prefix.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the maximum number of pooled connections.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the upper bound of the random TTL jitter.
    pub fn with_max_ttl_jitter(mut self, jitter: Duration) -> Self {
        self.max_ttl_jitter = jitter;
        self
    }
}

/// Redis implementation of the read cache port.
#[derive(Clone)]
pub struct RedisReadCache {
    pool: bb8::Pool<RedisConnectionManager>,
    namespace: String,
    max_ttl_jitter: Duration,
}

impl RedisReadCache {
    /// Connect the cache pool.
    ///
    /// # Errors
    ///
    /// Returns [`ReadCacheError::Backend`] when the URL is invalid or the
    /// pool cannot be built.
    pub async fn connect(config: RedisCacheConfig) -> Result<Self, ReadCacheError> {
        let manager = RedisConnectionManager::new(config.url.as_str())
            .map_err(|err| ReadCacheError::backend(err.to_string()))?;
        let pool = bb8::Pool::builder()
            .max_size(config.max_size)
            .build(manager)
            .await
            .map_err(|err| ReadCacheError::backend(err.to_string()))?;

        Ok(Self {
            pool,
            namespace: config.namespace,
            max_ttl_jitter: config.max_ttl_jitter,
        })
    }

    fn namespaced(&self, key: &CacheKey) -> String {
        format!("{}:{}", self.namespace, key.as_str())
    }

    fn jittered_seconds(&self, ttl: Duration) -> u64 {
        jittered_seconds(ttl, self.max_ttl_jitter, &mut rand::thread_rng())
    }
}

/// TTL in whole seconds with up to `max_jitter` added, never below one
/// second so an entry cannot be stored without expiry.
fn jittered_seconds<R: Rng>(ttl: Duration, max_jitter: Duration, rng: &mut R) -> u64 {
    let base = ttl.as_secs().max(1);
    let jitter_bound = max_jitter.as_secs();
    if jitter_bound == 0 {
        return base;
    }
    base + rng.gen_range(0..=jitter_bound)
}

#[async_trait]
impl ReadCache for RedisReadCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<serde_json::Value>, ReadCacheError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| ReadCacheError::backend(err.to_string()))?;

        let raw: Option<String> = conn
            .get(self.namespaced(key))
            .await
            .map_err(|err| ReadCacheError::backend(err.to_string()))?;

        raw.map(|payload| {
            serde_json::from_str(&payload)
                .map_err(|err| ReadCacheError::serialization(err.to_string()))
        })
        .transpose()
    }

    async fn put(
        &self,
        key: &CacheKey,
        value: &serde_json::Value,
        ttl: Duration,
    ) -> Result<(), ReadCacheError> {
        let payload = serde_json::to_string(value)
            .map_err(|err| ReadCacheError::serialization(err.to_string()))?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| ReadCacheError::backend(err.to_string()))?;

        let () = conn
            .set_ex(self.namespaced(key), payload, self.jittered_seconds(ttl))
            .await
            .map_err(|err| ReadCacheError::backend(err.to_string()))?;
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<(), ReadCacheError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| ReadCacheError::backend(err.to_string()))?;

        let () = conn
            .del(self.namespaced(key))
            .await
            .map_err(|err| ReadCacheError::backend(err.to_string()))?;
        Ok(())
    }
}
