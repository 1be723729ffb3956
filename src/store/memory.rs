//! In-process store
//!
//! Same contract as Redis, scoped to one process. Expiry runs on the tokio
//! clock so tests can pause and advance time.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{SetOptions, Store};
use crate::error::StoreError;

type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone)]
struct Entry {
    data: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Tracks store command counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CommandCounts {
    pub get: usize,
    pub set: usize,
    pub del: usize,
    pub exists: usize,
}

/// In-memory [`Store`] implementation.
///
/// Cloning shares the underlying map, so clones behave like separate
/// connections to one server.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    counts: Arc<Mutex<CommandCounts>>,
    /// Error to return from the next command (if any) - consumed on first use
    fail_next: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next command fail as if the store were unreachable.
    pub async fn fail_next(&self, message: &str) {
        *self.fail_next.lock().await = Some(message.to_string());
    }

    /// Snapshot of the command counters.
    pub async fn command_counts(&self) -> CommandCounts {
        self.counts.lock().await.clone()
    }

    /// Number of live (unexpired) keys.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|e| !e.is_expired(now))
            .count()
    }

    async fn check_failure(&self) -> Result<()> {
        match self.fail_next.lock().await.take() {
            Some(message) => Err(StoreError::Unavailable(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.counts.lock().await.get += 1;
        self.check_failure().await?;

        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.data.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8], options: SetOptions) -> Result<bool> {
        self.counts.lock().await.set += 1;
        self.check_failure().await?;

        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        if options.only_if_absent
            && let Some(existing) = entries.get(key)
            && !existing.is_expired(now)
        {
            return Ok(false);
        }

        entries.insert(
            key.to_string(),
            Entry {
                data: value.to_vec(),
                expires_at: options.ttl.map(|ttl| now + ttl),
            },
        );
        Ok(true)
    }

    async fn del(&self, key: &str) -> Result<bool> {
        self.counts.lock().await.del += 1;
        self.check_failure().await?;

        let now = Instant::now();
        let removed = self.entries.lock().await.remove(key);
        Ok(removed.is_some_and(|e| !e.is_expired(now)))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.counts.lock().await.exists += 1;
        self.check_failure().await?;

        let now = Instant::now();
        Ok(self
            .entries
            .lock()
            .await
            .get(key)
            .is_some_and(|e| !e.is_expired(now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_set_get() {
        let store = MemoryStore::new();
        store
            .set("key1", b"small data", SetOptions::default())
            .await
            .unwrap();

        let result = store.get("key1").await.unwrap();
        assert_eq!(result, Some(b"small data".to_vec()));
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let store = MemoryStore::new();
        assert!(store.get("NO SUCH RECORD").await.unwrap().is_none());
        assert!(!store.exists("NO SUCH RECORD").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiration() {
        let store = MemoryStore::new();
        store
            .set("key3", b"data", SetOptions::expiring(Duration::from_secs(10)))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(store.exists("key3").await.unwrap());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(store.get("key3").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_if_absent_only_once() {
        let store = MemoryStore::new();
        let opts = SetOptions::create_if_absent(Duration::from_secs(30));

        assert!(store.set("k:lock", b"1", opts).await.unwrap());
        assert!(!store.set("k:lock", b"1", opts).await.unwrap());

        assert!(store.del("k:lock").await.unwrap());
        assert!(store.set("k:lock", b"1", opts).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_if_absent_after_lease_expiry() {
        let store = MemoryStore::new();
        let opts = SetOptions::create_if_absent(Duration::from_secs(30));

        assert!(store.set("k:lock", b"1", opts).await.unwrap());
        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(store.set("k:lock", b"1", opts).await.unwrap());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let a = MemoryStore::new();
        let b = a.clone();

        a.set("shared", b"v", SetOptions::default()).await.unwrap();
        assert_eq!(b.get("shared").await.unwrap(), Some(b"v".to_vec()));
        assert_eq!(b.len().await, 1);
    }

    #[tokio::test]
    async fn test_fail_next_is_consumed() {
        let store = MemoryStore::new();
        store.fail_next("connection refused").await;

        assert!(matches!(
            store.get("k").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.get("k").await.unwrap().is_none());

        let counts = store.command_counts().await;
        assert_eq!(counts.get, 2);
    }
}
