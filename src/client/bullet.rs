//! HTTP client for the upstream `/bullet` endpoint

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde_json::json;

use super::rate_limit::ReactiveRateLimiter;
use super::{BulletApi, BulletToken};
use crate::error::{ApiError, Result};

/// Path of the login endpoint under the upstream base URL
const BULLET_PATH: &str = "/bullet";

/// Upstream login is slow; give it the same ceiling as the lock lease
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Retry-After fallback when a 429 carries none
const DEFAULT_RETRY_AFTER: u64 = 60;

/// Login upstream client
pub struct BulletClient {
    http: HttpClient,
    base_url: String,
    rate_limiter: ReactiveRateLimiter,
}

impl BulletClient {
    /// Create a client for the upstream at `base_url` (without `/bullet`).
    pub fn new(base_url: &str) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("iksm-token/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter: ReactiveRateLimiter::default(),
        })
    }
}

#[async_trait]
impl BulletApi for BulletClient {
    async fn fetch_bullet(&self, session_token: &str) -> Result<BulletToken> {
        self.rate_limiter.wait_if_active().await;

        let url = format!("{}{}", self.base_url, BULLET_PATH);
        let response = self
            .http
            .post(&url)
            .json(&json!({ "sessionToken": session_token }))
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                let token = response.json::<BulletToken>().await.map_err(|e| {
                    ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
                })?;
                Ok(token)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Unauthorized.into()),
            StatusCode::TOO_MANY_REQUESTS => {
                self.rate_limiter.activate();
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_RETRY_AFTER);
                Err(ApiError::RateLimit(Duration::from_secs(retry_after)).into())
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Bad request".to_string());
                Err(ApiError::BadRequest(error_msg).into())
            }
            status if status.is_server_error() => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("Server error: {}", status));
                Err(ApiError::ServerError(error_msg).into())
            }
            _ => {
                let reason = status.canonical_reason().unwrap_or("unexpected status");
                Err(ApiError::InvalidResponse(reason.to_string()).into())
            }
        }
    }
}
