//! Error types for iksm-token

use std::time::Duration;
use thiserror::Error;

/// Result type alias for iksm-token operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Cannot acquire lock {key} within {}s", .waited.as_secs())]
    LockTimeout { key: String, waited: Duration },

    #[error("Timed out after {}s waiting for cache entry {key}", .waited.as_secs())]
    CacheTimeout { key: String, waited: Duration },

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Shared key-value store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store command failed: {0}")]
    Command(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_connection_dropped() || err.is_timeout() {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Command(err.to_string())
        }
    }
}

/// Encrypted cache codec errors
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Wrong secret, tampered or truncated blob. Never carries plaintext.
    #[error("Authentication failed: cached blob could not be decrypted")]
    AuthenticationFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Encryption failed")]
    Encryption,
}

/// Upstream login API errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Session token rejected by upstream")]
    Unauthorized,

    #[error("Rate limit exceeded. Retry after {0:?}")]
    RateLimit(Duration),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Could not get bullet token: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to upstream".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("Redis URL is not set. Pass --redis-url or set REDIS_URL.")]
    MissingRedisUrl,

    #[error("Upstream URL is not set. Add `upstream_url` to the config file.")]
    MissingUpstreamUrl,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_timeout_message() {
        let err = Error::LockTimeout {
            key: "k:lock".to_string(),
            waited: Duration::from_secs(30),
        };
        let msg = err.to_string();
        assert!(msg.contains("k:lock"));
        assert!(msg.contains("30s"));
    }

    #[test]
    fn test_cache_timeout_message() {
        let err = Error::CacheTimeout {
            key: "k".to_string(),
            waited: Duration::from_secs(30),
        };
        assert!(err.to_string().contains("Timed out after 30s"));
    }

    #[test]
    fn test_authentication_failed_is_distinct() {
        let err: Error = CryptoError::AuthenticationFailed.into();
        match err {
            Error::Crypto(CryptoError::AuthenticationFailed) => (),
            _ => panic!("Expected Error::Crypto(CryptoError::AuthenticationFailed)"),
        }
    }

    #[test]
    fn test_api_error_rate_limit() {
        let err = ApiError::RateLimit(Duration::from_secs(30));
        let msg = err.to_string();
        assert!(msg.contains("Rate limit"));
        assert!(msg.contains("30"));
    }

    #[test]
    fn test_store_error_from_redis_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: StoreError = redis::RedisError::from(io).into();
        match err {
            StoreError::Unavailable(_) => (),
            other => panic!("Expected StoreError::Unavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_config_error_missing_redis_url() {
        let err = ConfigError::MissingRedisUrl;
        assert!(err.to_string().contains("REDIS_URL"));
    }

    #[test]
    fn test_config_error_from_yaml_error() {
        let yaml_str = "invalid: [yaml: content";
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let config_err: ConfigError = yaml_err.into();

        match config_err {
            ConfigError::ParseError(_) => (),
            _ => panic!("Expected ConfigError::ParseError"),
        }
    }
}
