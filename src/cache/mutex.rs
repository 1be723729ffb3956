//! Distributed mutex on `SET NX EX`
//!
//! Exactly one process at a time can create the lock key. The key carries a
//! lease so a crashed holder cannot block others for longer than that.
//! Nothing renews the lease: a holder that runs past it may overlap with the
//! next one.

use std::future::Future;
use std::sync::Arc;
use tokio::time::Instant;

use super::LockTiming;
use crate::error::{Error, Result};
use crate::store::{SetOptions, Store};

/// Sentinel stored under a lock key; presence means held
const LOCK_VALUE: &[u8] = b"1";

/// A held lock.
///
/// Release with [`LockGuard::release`] or [`LockGuard::run`]. A guard dropped
/// without either (the owning future was cancelled) still deletes the lock
/// key from a background task.
pub struct LockGuard {
    store: Arc<dyn Store>,
    key: String,
    released: bool,
}

impl LockGuard {
    #[allow(dead_code)]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Delete the lock key.
    ///
    /// If this future is dropped before the delete returns, the guard's
    /// `Drop` still releases the lock.
    pub async fn release(mut self) -> Result<()> {
        let deleted = self.store.del(&self.key).await;
        self.released = true;
        deleted?;
        log::debug!("Released lock {}", self.key);
        Ok(())
    }

    /// Await `fut` while holding the lock, then release it on every path.
    ///
    /// A failure from `fut` wins over a failure to release.
    pub async fn run<T, Fut>(self, fut: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let result = fut.await;
        let key = self.key.clone();

        match self.release().await {
            Ok(()) => result,
            Err(release_err) => {
                log::warn!("Failed to release lock {}: {}", key, release_err);
                result.and(Err(release_err))
            }
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            log::warn!("Lock {} dropped outside a runtime, left to expire", self.key);
            return;
        };

        let store = Arc::clone(&self.store);
        let key = std::mem::take(&mut self.key);
        log::debug!("Lock {} dropped while held, releasing in background", key);
        handle.spawn(async move {
            if let Err(e) = store.del(&key).await {
                log::warn!("Failed to release lock {}: {}", key, e);
            }
        });
    }
}

/// Named lock shared by every process using the same store.
#[derive(Clone)]
pub struct DistributedMutex {
    store: Arc<dyn Store>,
    timing: LockTiming,
}

impl DistributedMutex {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            timing: LockTiming::default(),
        }
    }

    pub fn with_timing(mut self, timing: LockTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Try once to take `lock_key`.
    ///
    /// Returns `None` if someone else holds it. Store errors are returned as
    /// is, without retrying.
    pub async fn try_acquire(&self, lock_key: &str) -> Result<Option<LockGuard>> {
        let acquired = self
            .store
            .set(
                lock_key,
                LOCK_VALUE,
                SetOptions::create_if_absent(self.timing.lease),
            )
            .await?;

        if !acquired {
            log::debug!("Lock {} is held elsewhere", lock_key);
            return Ok(None);
        }

        log::debug!("Acquired lock {}", lock_key);
        Ok(Some(LockGuard {
            store: Arc::clone(&self.store),
            key: lock_key.to_string(),
            released: false,
        }))
    }

    /// Run `f` with exclusive rights to `lock_key`.
    ///
    /// If another process holds the lock, wait until it is gone and then run
    /// `f` anyway. The winner's result is not shared, so callers that must
    /// not repeat `f` check a cache inside it.
    pub async fn with_lock<T, F, Fut>(&self, lock_key: &str, f: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(guard) = self.try_acquire(lock_key).await? {
            return guard.run(f()).await;
        }

        self.wait_for_release(lock_key).await?;
        f().await
    }

    /// Poll until `lock_key` disappears or the wait timeout passes.
    async fn wait_for_release(&self, lock_key: &str) -> Result<()> {
        let started = Instant::now();
        let deadline = started + self.timing.wait_timeout;

        while self.store.exists(lock_key).await? {
            let now = Instant::now();
            if now >= deadline {
                log::debug!("Gave up waiting for lock {}", lock_key);
                return Err(Error::LockTimeout {
                    key: lock_key.to_string(),
                    waited: now - started,
                });
            }
            tokio::time::sleep(self.timing.poll_interval.min(deadline - now)).await;
        }
        Ok(())
    }
}
