//! Cache key generation using SHA-256 hashes

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Prefix shared by every bullet token entry
const TOKEN_KEY_PREFIX: &str = "iksm-token:bullet";

/// Session ids are UUIDs; anything shorter is rejected
const MIN_SESSION_ID_LEN: usize = 36;

/// Format version of cached values. Bump to orphan old entries.
pub fn cache_version() -> String {
    format!("v1-{}", env!("CARGO_PKG_VERSION"))
}

/// Hex-encoded SHA-256 of a UTF-8 string
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Cache key for the bullet token of one session.
///
/// The session token never appears in the key, only in the hash, and the
/// version tag keeps entries written by older builds from being read back.
pub fn token_cache_key(session_id: &str, session_token: &str) -> Result<String> {
    if session_id.len() < MIN_SESSION_ID_LEN {
        return Err(Error::Other("sessionId is missing or too short".to_string()));
    }

    let hash = sha256_hex(&format!("{}{}", session_id, session_token));
    Ok(format!("{}:{}:{}", TOKEN_KEY_PREFIX, cache_version(), hash))
}
