//! Read-through cache with single-flight population
//!
//! Only the process that wins the lock calls the producer. Everyone else
//! polls the cache key until the winner's value shows up.

use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::{CacheCodec, CacheTtl, DistributedMutex, JsonCodec, LockTiming, lock_key};
use crate::error::{Error, Result};
use crate::store::{SetOptions, Store};

/// Cached-compute wrapper over a shared [`Store`].
pub struct CachedCompute<C = JsonCodec> {
    store: Arc<dyn Store>,
    mutex: DistributedMutex,
    codec: C,
    ttl: Duration,
    timing: LockTiming,
}

impl CachedCompute<JsonCodec> {
    /// Plain JSON entries kept for [`CacheTtl::PLAIN`].
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            mutex: DistributedMutex::new(Arc::clone(&store)),
            store,
            codec: JsonCodec,
            ttl: CacheTtl::PLAIN,
            timing: LockTiming::default(),
        }
    }
}

impl<C: CacheCodec> CachedCompute<C> {
    /// Swap the codec and entry TTL.
    pub fn with_codec<D: CacheCodec>(self, codec: D, ttl: Duration) -> CachedCompute<D> {
        CachedCompute {
            store: self.store,
            mutex: self.mutex,
            codec,
            ttl,
            timing: self.timing,
        }
    }

    pub fn with_timing(mut self, timing: LockTiming) -> Self {
        self.mutex = self.mutex.with_timing(timing);
        self.timing = timing;
        self
    }

    /// Return the cached value for `cache_key`, computing it at most once
    /// across all callers sharing the store.
    ///
    /// On a miss the lock winner runs `producer` and stores its result; the
    /// lock is released whether the producer succeeds or not. Losers poll
    /// the cache and fail with [`Error::CacheTimeout`] if nothing appears in
    /// time. A failed producer is not cached, so its waiters time out and the
    /// next caller tries again.
    pub async fn with_caching<T, F, Fut>(&self, cache_key: &str, producer: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(data) = self.store.get(cache_key).await? {
            log::debug!("Cache hit: {}", cache_key);
            return self.codec.decode(&data).await;
        }
        log::debug!("Cache miss: {}", cache_key);

        let lock_key = lock_key(cache_key);
        if let Some(guard) = self.mutex.try_acquire(&lock_key).await? {
            return guard
                .run(async {
                    let value = producer().await?;
                    let data = self.codec.encode(&value).await?;
                    self.store
                        .set(cache_key, &data, SetOptions::expiring(self.ttl))
                        .await?;
                    Ok(value)
                })
                .await;
        }

        self.wait_for_value(cache_key).await
    }

    /// Poll `cache_key` until it is populated or the wait timeout passes.
    async fn wait_for_value<T: DeserializeOwned + Send>(&self, cache_key: &str) -> Result<T> {
        let started = Instant::now();
        let deadline = started + self.timing.wait_timeout;

        loop {
            if let Some(data) = self.store.get(cache_key).await? {
                log::debug!("Cache populated while waiting: {}", cache_key);
                return self.codec.decode(&data).await;
            }

            let now = Instant::now();
            if now >= deadline {
                log::debug!("Gave up waiting for cache entry {}", cache_key);
                return Err(Error::CacheTimeout {
                    key: cache_key.to_string(),
                    waited: now - started,
                });
            }
            tokio::time::sleep(self.timing.poll_interval.min(deadline - now)).await;
        }
    }
}
