//! PIN verification hashing.
//!
//! The verification hash is a local unlock check only: a match authorizes
//! proceeding to master-key derivation, it is never a substitute for the
//! master key. An attacker who forges a verification record without knowing
//! the PIN still cannot produce a working master key.

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use shardvault_common::Result;

use crate::kdf::{stretch_pin, KdfParams};
use crate::keys::Salt;

/// Length of the PIN verification hash in bytes.
pub const PIN_HASH_LENGTH: usize = 32;

/// Hash a PIN with a salt at the cheap verification cost tier.
///
/// Uses the same Argon2id family as master-key derivation but with
/// [`KdfParams::verification`], since this path runs on every unlock
/// attempt. The salt must be distinct from the master-key salt.
///
/// # Errors
/// - Returns error if the PIN is empty
pub fn hash_pin(pin: &str, salt: &Salt) -> Result<[u8; PIN_HASH_LENGTH]> {
    stretch_pin(pin, salt, &KdfParams::verification())
}

/// Verify a PIN against a stored hash in constant time.
///
/// The comparison cost is independent of where the first mismatching byte
/// occurs, so timing cannot reveal partial matches.
///
/// # Errors
/// - Returns error if the PIN is empty
pub fn verify_pin(pin: &str, salt: &Salt, stored_hash: &[u8]) -> Result<bool> {
    let computed = hash_pin(pin, salt)?;
    Ok(computed.ct_eq(stored_hash).into())
}

/// Persisted PIN verification data.
///
/// Non-secret: the hash alone does not yield the PIN without brute force at
/// the configured cost, and a match does not reveal or equal the master key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinVerificationRecord {
    /// Salt for the verification hash, independent of the master-key salt.
    pub salt: Salt,
    /// Argon2id output over (PIN, salt) at the verification cost tier.
    pub hash: [u8; PIN_HASH_LENGTH],
}

impl PinVerificationRecord {
    /// Create a record for a PIN with a freshly generated salt.
    ///
    /// # Errors
    /// - Returns error if the PIN is empty
    /// - Returns error if the OS randomness source fails
    pub fn create(pin: &str) -> Result<Self> {
        let salt = Salt::generate()?;
        let hash = hash_pin(pin, &salt)?;
        Ok(Self { salt, hash })
    }

    /// Verify a PIN against this record.
    ///
    /// # Errors
    /// - Returns error if the PIN is empty
    pub fn verify(&self, pin: &str) -> Result<bool> {
        verify_pin(pin, &self.salt, &self.hash)
    }
}
