//! Cached wrapper for the login client
//!
//! Bullet tokens are cached per (session id, session token) pair, encrypted
//! with the session token, so a reader of the shared store learns nothing
//! without already holding that token.

use async_trait::async_trait;
use std::sync::Arc;

use super::{
    CacheCodec, CacheTtl, CachedCompute, DistributedMutex, EncryptedJsonCodec, LockTiming,
    lock_key, token_cache_key,
};
use crate::client::{BulletApi, BulletToken};
use crate::config::CacheStrategy;
use crate::error::Result;
use crate::store::{SetOptions, Store};

/// Cached wrapper for any [`BulletApi`] implementation.
pub struct CachedBulletClient<C: BulletApi> {
    inner: C,
    store: Arc<dyn Store>,
    strategy: CacheStrategy,
    timing: LockTiming,
}

impl<C: BulletApi> CachedBulletClient<C> {
    /// Create a new cached client wrapper.
    ///
    /// # Arguments
    /// * `inner` - The underlying login client to wrap
    /// * `store` - Shared store holding tokens and locks
    pub fn new(inner: C, store: Arc<dyn Store>) -> Self {
        Self {
            inner,
            store,
            strategy: CacheStrategy::default(),
            timing: LockTiming::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: CacheStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_timing(mut self, timing: LockTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Get the inner client
    #[allow(dead_code)]
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Get a bullet token for `session_token`.
    ///
    /// Without a session id (or with an empty one) there is nothing to key
    /// the cache on, so the upstream is called directly.
    pub async fn get_token(
        &self,
        session_token: &str,
        session_id: Option<&str>,
    ) -> Result<BulletToken> {
        let Some(session_id) = session_id.filter(|id| !id.is_empty()) else {
            log::debug!("No session id, bypassing cache");
            return self.inner.fetch_bullet(session_token).await;
        };

        let cache_key = token_cache_key(session_id, session_token)?;
        match self.strategy {
            CacheStrategy::SingleFlight => self.single_flight(&cache_key, session_token).await,
            CacheStrategy::Mutex => self.queued(&cache_key, session_token).await,
        }
    }

    /// Lock winner fetches; others poll until the token lands in the cache.
    async fn single_flight(&self, cache_key: &str, session_token: &str) -> Result<BulletToken> {
        let compute = CachedCompute::new(Arc::clone(&self.store))
            .with_codec(EncryptedJsonCodec::new(session_token), CacheTtl::TOKEN)
            .with_timing(self.timing);

        compute
            .with_caching(cache_key, || self.inner.fetch_bullet(session_token))
            .await
    }

    /// Losers wait for the lock to clear and then re-check the cache, so only
    /// the holder reaches the upstream.
    async fn queued(&self, cache_key: &str, session_token: &str) -> Result<BulletToken> {
        let codec = EncryptedJsonCodec::new(session_token);

        if let Some(data) = self.store.get(cache_key).await? {
            log::debug!("Cache hit: {}", cache_key);
            return codec.decode(&data).await;
        }

        let mutex = DistributedMutex::new(Arc::clone(&self.store)).with_timing(self.timing);
        mutex
            .with_lock(&lock_key(cache_key), || async {
                if let Some(data) = self.store.get(cache_key).await? {
                    log::debug!("Cache filled by previous holder: {}", cache_key);
                    return codec.decode(&data).await;
                }

                let token = self.inner.fetch_bullet(session_token).await?;
                let data = codec.encode(&token).await?;
                self.store
                    .set(cache_key, &data, SetOptions::expiring(CacheTtl::TOKEN))
                    .await?;
                Ok(token)
            })
            .await
    }
}

#[async_trait]
impl<C: BulletApi> BulletApi for CachedBulletClient<C> {
    /// Uncached: a bare session token has no session id to key on
    async fn fetch_bullet(&self, session_token: &str) -> Result<BulletToken> {
        self.inner.fetch_bullet(session_token).await
    }
}
