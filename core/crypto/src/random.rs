//! Fail-closed secure randomness.
//!
//! All random material (salts, file encryption keys, IVs, fragment ids)
//! comes from the operating system's CSPRNG. If the OS source is
//! unavailable, the operation fails with an error; nothing ever falls back
//! to a non-cryptographic generator.

use rand::rngs::OsRng;
use rand::TryRngCore;

use shardvault_common::{Error, Result};

use crate::cipher::IV_LENGTH;

/// Fill a buffer with cryptographically secure random bytes.
///
/// # Errors
/// - Returns error if the OS randomness source fails
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| Error::Crypto(format!("OS randomness source unavailable: {}", e)))
}

/// Generate `n` cryptographically secure random bytes.
///
/// # Errors
/// - Returns error if the OS randomness source fails
pub fn generate_random_bytes(n: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; n];
    fill_random(&mut bytes)?;
    Ok(bytes)
}

/// Generate a random 96-bit initialization vector for the AEAD.
///
/// # Errors
/// - Returns error if the OS randomness source fails
pub fn generate_iv() -> Result<[u8; IV_LENGTH]> {
    let mut iv = [0u8; IV_LENGTH];
    fill_random(&mut iv)?;
    Ok(iv)
}
