//! Upstream login client
//!
//! Exchanging a session token for a bullet token is slow and rate limited
//! upstream, which is the reason the cache exists.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod bullet;
#[cfg(test)]
pub mod mock;
pub mod rate_limit;

pub use bullet::BulletClient;
#[cfg(test)]
pub use mock::MockBulletClient;

/// Upstream login API trait
#[async_trait]
pub trait BulletApi: Send + Sync {
    /// Exchange a session token for a fresh bullet token
    async fn fetch_bullet(&self, session_token: &str) -> Result<BulletToken>;
}

/// Short-lived access token returned by the login flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletToken {
    /// The bullet token itself
    pub bullet: String,

    /// Account language (e.g. "en-US")
    pub language: String,

    /// Account country (e.g. "US")
    pub country: String,

    /// Web app version the token was issued for
    pub version: String,
}
