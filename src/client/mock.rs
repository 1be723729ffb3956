//! Mock login client for testing
//!
//! Counts calls and can be slowed down or made to fail, so cache tests can
//! check how often the upstream was really hit.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::{BulletApi, BulletToken};
use crate::error::{ApiError, Result};

/// Mock login client for testing.
///
/// # Example
/// ```ignore
/// let mock = MockBulletClient::new().with_delay(Duration::from_secs(2));
/// let token = mock.fetch_bullet("session-token").await?;
/// assert_eq!(mock.call_count().await, 1);
/// ```
#[derive(Clone, Default)]
pub struct MockBulletClient {
    /// Simulated upstream latency
    delay: Duration,
    /// Error to return (if any) - consumed on first use
    error: Arc<Mutex<Option<ApiError>>>,
    /// Session tokens seen, in call order
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockBulletClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call take `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Configure an error to return on the next call.
    pub async fn with_error(self, error: ApiError) -> Self {
        *self.error.lock().await = Some(error);
        self
    }

    /// Number of upstream calls made so far.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// Session tokens passed to each call.
    #[allow(dead_code)]
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    /// Token the mock hands out for `session_token`.
    pub fn token_for(session_token: &str) -> BulletToken {
        BulletToken {
            bullet: format!("bullet-for-{}", session_token),
            language: "en-US".to_string(),
            country: "US".to_string(),
            version: "6.0.0-mock".to_string(),
        }
    }
}

#[async_trait]
impl BulletApi for MockBulletClient {
    async fn fetch_bullet(&self, session_token: &str) -> Result<BulletToken> {
        self.calls.lock().await.push(session_token.to_string());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if let Some(e) = self.error.lock().await.take() {
            return Err(e.into());
        }

        Ok(Self::token_for(session_token))
    }
}
