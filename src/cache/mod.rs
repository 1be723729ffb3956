//! Single-flight cache over a shared store
//!
//! A lock key (`<cache key>:lock`) created with `SET NX EX` decides which
//! process calls the producer; everybody else waits on the cache key.

pub mod client;
pub mod codec;
pub mod compute;
pub mod key;
pub mod mutex;

use std::time::Duration;

/// Cache TTL configuration per value type
pub struct CacheTtl;

impl CacheTtl {
    /// Plain JSON values
    pub const PLAIN: Duration = Duration::from_secs(10 * 60); // 10 min
    /// Encrypted bullet tokens
    pub const TOKEN: Duration = Duration::from_secs(60 * 60); // 1 hr
}

/// Lock lease and wait parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockTiming {
    /// Expiry on the lock key, bounds how long a crashed holder blocks others
    pub lease: Duration,
    /// Delay between polls while waiting
    pub poll_interval: Duration,
    /// Give up waiting after this long
    pub wait_timeout: Duration,
}

impl Default for LockTiming {
    fn default() -> Self {
        Self {
            lease: Duration::from_secs(30),
            poll_interval: Duration::from_millis(200),
            wait_timeout: Duration::from_secs(30),
        }
    }
}

/// Lock key guarding `cache_key`
pub fn lock_key(cache_key: &str) -> String {
    format!("{}:lock", cache_key)
}

// Re-export main types
pub use client::CachedBulletClient;
pub use codec::{CacheCodec, EncryptedJsonCodec, JsonCodec};
pub use compute::CachedCompute;
pub use key::{sha256_hex, token_cache_key};
pub use mutex::DistributedMutex;
