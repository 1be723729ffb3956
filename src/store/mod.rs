//! Shared key-value store
//!
//! Everything the lock and the cache need from the store is four commands:
//! `GET`, `SET [EX] [NX]`, `DEL` and `EXISTS`. Any store that offers an atomic
//! conditional set with expiry can back this crate.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::StoreError;

#[cfg(test)]
pub mod memory;
pub mod redis_store;

#[cfg(test)]
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

type Result<T> = std::result::Result<T, StoreError>;

/// Options for [`Store::set`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Expire the key after this duration (`EX`)
    pub ttl: Option<Duration>,
    /// Only write if the key does not exist yet (`NX`)
    pub only_if_absent: bool,
}

impl SetOptions {
    /// Plain write with an expiry.
    pub fn expiring(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            only_if_absent: false,
        }
    }

    /// Atomic create-if-absent with an expiry, the lock primitive.
    pub fn create_if_absent(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            only_if_absent: true,
        }
    }
}

/// Shared store trait
#[async_trait]
pub trait Store: Send + Sync {
    /// Read a key. Expired keys read as absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write a key. Returns `false` only when `only_if_absent` was set and the
    /// key already existed.
    async fn set(&self, key: &str, value: &[u8], options: SetOptions) -> Result<bool>;

    /// Delete a key. Returns whether a key was removed.
    async fn del(&self, key: &str) -> Result<bool>;

    /// Check whether a key exists.
    async fn exists(&self, key: &str) -> Result<bool>;
}
