//! Password-based encryption for cached tokens
//!
//! Blob layout: `salt(16) || nonce(16) || tag(16) || ciphertext`.
//!
//! The key is derived with Argon2id from the caller's secret and a fresh salt,
//! then used once for AES-256-GCM with a fresh 16-byte nonce. Anyone reading
//! the shared store without the original secret sees only random bytes.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Nonce, Tag};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

use crate::error::CryptoError;

/// AES-256-GCM with a 128-bit nonce
type Cipher = AesGcm<Aes256, U16>;

pub const SALT_SIZE: usize = 16;
pub const NONCE_SIZE: usize = 16;
pub const TAG_SIZE: usize = 16;
const KEY_SIZE: usize = 32;

/// Offset of the ciphertext within a blob
pub const HEADER_SIZE: usize = SALT_SIZE + NONCE_SIZE + TAG_SIZE;

// Argon2id cost: 19 MiB, 2 passes, 1 lane
const KDF_MEMORY_KIB: u32 = 19 * 1024;
const KDF_ITERATIONS: u32 = 2;
const KDF_LANES: u32 = 1;

type Result<T> = std::result::Result<T, CryptoError>;

fn derive_key(secret: &str, salt: &[u8]) -> Result<[u8; KEY_SIZE]> {
    let params = Params::new(KDF_MEMORY_KIB, KDF_ITERATIONS, KDF_LANES, Some(KEY_SIZE))
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    let mut key = [0u8; KEY_SIZE];
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password_into(secret.as_bytes(), salt, &mut key)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(key)
}

/// Encrypt `plaintext` under a key derived from `secret`.
///
/// Salt and nonce are random per call, so equal inputs never produce equal
/// blobs.
pub fn encrypt(secret: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut rng = rand::thread_rng();
    let mut salt = [0u8; SALT_SIZE];
    let mut nonce = [0u8; NONCE_SIZE];
    rng.fill_bytes(&mut salt);
    rng.fill_bytes(&mut nonce);

    let key = derive_key(secret, &salt)?;
    let cipher = Cipher::new_from_slice(&key).map_err(|_| CryptoError::Encryption)?;

    let mut ciphertext = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::<U16>::from_slice(&nonce), b"", &mut ciphertext)
        .map_err(|_| CryptoError::Encryption)?;

    let mut blob = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&tag);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Decrypt a blob produced by [`encrypt`].
///
/// Fails with [`CryptoError::AuthenticationFailed`] on a wrong secret, a
/// truncated blob or any modified byte.
pub fn decrypt(secret: &str, blob: &[u8]) -> Result<Vec<u8>> {
    if blob.len() < HEADER_SIZE {
        return Err(CryptoError::AuthenticationFailed);
    }

    let (salt, rest) = blob.split_at(SALT_SIZE);
    let (nonce, rest) = rest.split_at(NONCE_SIZE);
    let (tag, ciphertext) = rest.split_at(TAG_SIZE);

    let key = derive_key(secret, salt)?;
    let cipher =
        Cipher::new_from_slice(&key).map_err(|_| CryptoError::AuthenticationFailed)?;

    let mut plaintext = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            Nonce::<U16>::from_slice(nonce),
            b"",
            &mut plaintext,
            Tag::from_slice(tag),
        )
        .map_err(|_| CryptoError::AuthenticationFailed)?;

    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let blob = encrypt("pass", b"hello").unwrap();
        let plaintext = decrypt("pass", &blob).unwrap();
        assert_eq!(plaintext, b"hello");
    }

    #[test]
    fn test_round_trip_empty_plaintext() {
        let blob = encrypt("pass", b"").unwrap();
        assert_eq!(blob.len(), HEADER_SIZE);
        assert!(decrypt("pass", &blob).unwrap().is_empty());
    }

    #[test]
    fn test_encrypt_is_not_deterministic() {
        let a = encrypt("pass", b"hello").unwrap();
        let b = encrypt("pass", b"hello").unwrap();

        assert_ne!(a, b);
        // Fresh salt and nonce each time
        assert_ne!(a[..SALT_SIZE], b[..SALT_SIZE]);
        assert_ne!(
            a[SALT_SIZE..SALT_SIZE + NONCE_SIZE],
            b[SALT_SIZE..SALT_SIZE + NONCE_SIZE]
        );
    }

    #[test]
    fn test_blob_layout() {
        let blob = encrypt("pass", b"hello").unwrap();
        // GCM is a stream mode: ciphertext length equals plaintext length
        assert_eq!(blob.len(), HEADER_SIZE + 5);
    }

    #[test]
    fn test_wrong_secret_fails() {
        let blob = encrypt("pass", b"hello").unwrap();
        assert!(matches!(
            decrypt("not-pass", &blob),
            Err(CryptoError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let blob = encrypt("pass", b"sensitive token").unwrap();

        // Every byte of the tag and ciphertext region is covered
        for i in SALT_SIZE + NONCE_SIZE..blob.len() {
            let mut tampered = blob.clone();
            tampered[i] ^= 0x01;
            assert!(
                matches!(
                    decrypt("pass", &tampered),
                    Err(CryptoError::AuthenticationFailed)
                ),
                "byte {i} was not authenticated"
            );
        }
    }

    #[test]
    fn test_tampered_nonce_fails() {
        let mut blob = encrypt("pass", b"hello").unwrap();
        blob[SALT_SIZE] ^= 0xff;
        assert!(decrypt("pass", &blob).is_err());
    }

    #[test]
    fn test_truncated_blob_fails() {
        let blob = encrypt("pass", b"hello").unwrap();
        assert!(matches!(
            decrypt("pass", &blob[..HEADER_SIZE - 1]),
            Err(CryptoError::AuthenticationFailed)
        ));
        assert!(matches!(
            decrypt("pass", &blob[..blob.len() - 1]),
            Err(CryptoError::AuthenticationFailed)
        ));
        assert!(decrypt("pass", &[]).is_err());
    }
}
