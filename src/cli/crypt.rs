//! Hash, encrypt and decrypt commands
//!
//! Encrypt reads raw bytes from stdin and prints a base64 blob; decrypt
//! reverses it. The blob is byte-for-byte what the cache stores.

use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;

use crate::cache::sha256_hex;
use crate::cli::{GlobalOptions, OutputFormat};
use crate::crypto;
use crate::error::{Error, Result};
use crate::output::json::format_json;

/// Print the SHA-256 hex digest of `input`
pub fn hash(opts: &GlobalOptions, input: &str) -> Result<()> {
    let digest = sha256_hex(input);
    match opts.format {
        OutputFormat::Pretty => println!("{}", digest),
        OutputFormat::Json => println!("{}", format_json(&json!({ "sha256": digest }))?),
    }
    Ok(())
}

/// Encrypt stdin under `secret`
pub fn encrypt(secret: &str) -> Result<()> {
    let mut plaintext = Vec::new();
    std::io::stdin().read_to_end(&mut plaintext)?;
    println!("{}", encode_blob(secret, &plaintext)?);
    Ok(())
}

/// Decrypt a base64 blob from stdin under `secret`
pub fn decrypt(secret: &str) -> Result<()> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    let plaintext = decode_blob(secret, &input)?;

    let mut stdout = std::io::stdout();
    stdout.write_all(&plaintext)?;
    stdout.flush()?;
    Ok(())
}

fn encode_blob(secret: &str, plaintext: &[u8]) -> Result<String> {
    let blob = crypto::encrypt(secret, plaintext)?;
    Ok(STANDARD.encode(blob))
}

fn decode_blob(secret: &str, encoded: &str) -> Result<Vec<u8>> {
    let blob = STANDARD
        .decode(encoded.trim())
        .map_err(|e| Error::Other(format!("Input is not valid base64: {}", e)))?;
    Ok(crypto::decrypt(secret, &blob)?)
}
