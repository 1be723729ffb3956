//! Reactive rate limiting for the login upstream
//!
//! Requests go out unthrottled until the upstream answers 429. From then on
//! every request waits for a permit from a fixed per-minute quota.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, Ordering};

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;

/// Login requests per minute once throttling kicks in
pub const LOGIN_REQUESTS_PER_MINUTE: u32 = 10;

/// Rate limiter that only applies after it has been activated.
pub struct ReactiveRateLimiter {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    active: AtomicBool,
}

impl Default for ReactiveRateLimiter {
    fn default() -> Self {
        Self::per_minute(LOGIN_REQUESTS_PER_MINUTE)
    }
}

impl ReactiveRateLimiter {
    /// Create a limiter allowing `per_minute` requests once active.
    pub fn per_minute(per_minute: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN));
        Self {
            limiter: RateLimiter::direct(quota),
            active: AtomicBool::new(false),
        }
    }

    /// Activate rate limiting (called on 429).
    pub fn activate(&self) {
        let was_active = self.active.swap(true, Ordering::SeqCst);
        if !was_active {
            debug!("Rate limiting activated for login upstream");
        }
    }

    /// Check if rate limiting is active.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Wait for permission if rate limiting is active.
    pub async fn wait_if_active(&self) {
        if self.is_active() {
            debug!("Waiting for login rate limiter");
            self.limiter.until_ready().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_by_default() {
        let limiter = ReactiveRateLimiter::default();
        assert!(!limiter.is_active());
    }

    #[test]
    fn test_activation_is_idempotent() {
        let limiter = ReactiveRateLimiter::per_minute(60);
        limiter.activate();
        assert!(limiter.is_active());

        limiter.activate();
        assert!(limiter.is_active());
    }

    #[tokio::test]
    async fn test_inactive_limiter_does_not_wait() {
        let limiter = ReactiveRateLimiter::per_minute(1);
        // Would block for a minute per call if the quota applied
        for _ in 0..5 {
            limiter.wait_if_active().await;
        }
    }

    #[tokio::test]
    async fn test_active_limiter_grants_first_permit() {
        let limiter = ReactiveRateLimiter::per_minute(60);
        limiter.activate();
        limiter.wait_if_active().await;
    }
}
