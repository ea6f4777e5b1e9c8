//! Master key derivation using Argon2id.
//!
//! Argon2id is a memory-hard password stretching function that provides
//! resistance to both GPU and time-memory trade-off attacks. The same
//! (PIN, salt, params) always yields the same 256-bit key, so the master
//! key is re-derived on every unlock and never persisted.

use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};

use shardvault_common::{Error, Result};

use crate::keys::{MasterKey, Salt, KEY_LENGTH};

/// Parameters for Argon2id key stretching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB (e.g., 65536 = 64 MiB).
    pub memory_cost: u32,
    /// Number of iterations.
    pub time_cost: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl KdfParams {
    /// Create parameters suitable for interactive use.
    ///
    /// These parameters provide a balance between security and usability,
    /// targeting approximately 0.5-1 second of derivation time.
    pub fn interactive() -> Self {
        Self {
            memory_cost: 65536, // 64 MiB
            time_cost: 3,
            parallelism: 4,
        }
    }

    /// Create moderate parameters for mobile devices.
    ///
    /// The default cost tier for master-key derivation: high enough to
    /// resist offline brute force of a low-entropy PIN, bounded for
    /// interactive mobile latency.
    pub fn moderate() -> Self {
        Self {
            memory_cost: 32768, // 32 MiB
            time_cost: 3,
            parallelism: 2,
        }
    }

    /// Create cheap parameters for the PIN verification hash.
    ///
    /// This tier runs on every unlock attempt and must stay responsive;
    /// the lower cost relative to [`KdfParams::moderate`] is an explicit
    /// security/usability tradeoff. A matching verification hash only
    /// authorizes proceeding to master-key derivation.
    pub fn verification() -> Self {
        Self {
            memory_cost: 8192, // 8 MiB
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::moderate()
    }
}

/// Derive a 256-bit output from a PIN and salt.
///
/// Shared by master-key derivation and PIN hashing; the two callers differ
/// only in cost parameters and must use different salts.
pub(crate) fn stretch_pin(
    pin: &str,
    salt: &Salt,
    params: &KdfParams,
) -> Result<[u8; KEY_LENGTH]> {
    if pin.is_empty() {
        return Err(Error::InvalidInput("PIN cannot be empty".to_string()));
    }

    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(KEY_LENGTH),
    )
    .map_err(|e| Error::Crypto(format!("Invalid KDF parameters: {}", e)))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut output = [0u8; KEY_LENGTH];
    argon2
        .hash_password_into(pin.as_bytes(), salt.as_bytes(), &mut output)
        .map_err(|e| Error::Crypto(format!("Key derivation failed: {}", e)))?;

    Ok(output)
}

/// Derive the master key from a PIN and salt using Argon2id.
///
/// # Preconditions
/// - `pin` must not be empty
///
/// # Postconditions
/// - The derived key is deterministic given the same inputs
/// - The master key exists only in memory and zeroizes on drop
///
/// # Errors
/// - Returns error if the PIN is empty
/// - Returns error if Argon2id parameters are invalid
///
/// # Security
/// - The PIN is not stored or logged
/// - The salt must differ from the PIN-verification salt to avoid
///   cross-purpose reuse of the stretch output
pub fn derive_master_key(pin: &str, salt: &Salt, params: &KdfParams) -> Result<MasterKey> {
    let key_bytes = stretch_pin(pin, salt, params)?;
    Ok(MasterKey::from_bytes(key_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key_deterministic() {
        let salt = Salt::from_bytes([42u8; 16]);
        let params = KdfParams::verification();

        let key1 = derive_master_key("123456", &salt, &params).unwrap();
        let key2 = derive_master_key("123456", &salt, &params).unwrap();

        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_derive_key_different_salt() {
        let salt1 = Salt::from_bytes([1u8; 16]);
        let salt2 = Salt::from_bytes([2u8; 16]);
        let params = KdfParams::verification();

        let key1 = derive_master_key("123456", &salt1, &params).unwrap();
        let key2 = derive_master_key("123456", &salt2, &params).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_derive_key_different_pin() {
        let salt = Salt::from_bytes([42u8; 16]);
        let params = KdfParams::verification();

        let key1 = derive_master_key("123456", &salt, &params).unwrap();
        let key2 = derive_master_key("654321", &salt, &params).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_derive_key_different_cost_tier() {
        let salt = Salt::from_bytes([42u8; 16]);

        let key1 = derive_master_key("123456", &salt, &KdfParams::verification()).unwrap();
        let key2 = derive_master_key("123456", &salt, &KdfParams::moderate()).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_derive_key_empty_pin_fails() {
        let salt = Salt::generate().unwrap();
        let params = KdfParams::verification();

        assert!(derive_master_key("", &salt, &params).is_err());
    }
}
