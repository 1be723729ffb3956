//! Value codecs for cache entries

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt;

use crate::crypto;
use crate::error::{CryptoError, Result};

/// Turns cached values into store bytes and back.
#[async_trait]
pub trait CacheCodec: Send + Sync {
    async fn encode<T: Serialize + Sync>(&self, value: &T) -> Result<Vec<u8>>;

    async fn decode<T: DeserializeOwned + Send>(&self, data: &[u8]) -> Result<T>;
}

/// Plain JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[async_trait]
impl CacheCodec for JsonCodec {
    async fn encode<T: Serialize + Sync>(&self, value: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    async fn decode<T: DeserializeOwned + Send>(&self, data: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(data)?)
    }
}

/// JSON encrypted with a key derived from a caller secret.
///
/// The secret is usually the session token the value was fetched with, so the
/// entry is only readable by someone who already holds that token. Key
/// derivation runs on the blocking pool.
#[derive(Clone)]
pub struct EncryptedJsonCodec {
    secret: String,
}

impl EncryptedJsonCodec {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for EncryptedJsonCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedJsonCodec")
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl CacheCodec for EncryptedJsonCodec {
    async fn encode<T: Serialize + Sync>(&self, value: &T) -> Result<Vec<u8>> {
        let json = serde_json::to_vec(value)?;
        let secret = self.secret.clone();
        let blob = tokio::task::spawn_blocking(move || crypto::encrypt(&secret, &json))
            .await
            .map_err(|e| CryptoError::KeyDerivation(e.to_string()))??;
        Ok(blob)
    }

    async fn decode<T: DeserializeOwned + Send>(&self, data: &[u8]) -> Result<T> {
        let secret = self.secret.clone();
        let blob = data.to_vec();
        let json = tokio::task::spawn_blocking(move || crypto::decrypt(&secret, &blob))
            .await
            .map_err(|e| CryptoError::KeyDerivation(e.to_string()))??;
        Ok(serde_json::from_slice(&json)?)
    }
}
