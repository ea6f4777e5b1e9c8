//! Vault configuration and PIN verification metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shardvault_common::{Error, Result};
use shardvault_crypto::{KdfParams, PinVerificationRecord, Salt};

/// Vault format version for migration support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultVersion {
    pub major: u32,
    pub minor: u32,
}

impl VaultVersion {
    /// Current vault format version.
    pub const CURRENT: Self = Self { major: 1, minor: 0 };

    /// Check if this version is compatible with the current version.
    pub fn is_compatible(&self) -> bool {
        self.major == Self::CURRENT.major
    }
}

impl Default for VaultVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

/// Persisted vault configuration.
///
/// Everything in here is non-secret: the key salt re-derives the master key
/// only in combination with the PIN, and the verification record does not
/// yield the PIN without brute force at the configured cost. The caller
/// persists this record locally alongside the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Vault format version.
    pub version: VaultVersion,
    /// Salt for master-key derivation. Immutable after creation.
    pub key_salt: Salt,
    /// KDF cost parameters for master-key derivation.
    pub kdf_params: KdfParams,
    /// PIN verification record, with its own independent salt.
    pub pin: PinVerificationRecord,
    /// Vault creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl VaultConfig {
    /// Create a new vault configuration for a PIN.
    ///
    /// # Postconditions
    /// - Key salt and PIN salt are generated independently; they never
    ///   coincide, so the cheap verification stretch and the master-key
    ///   stretch are computed over different inputs
    ///
    /// # Errors
    /// - PIN empty
    /// - OS randomness source failure
    pub fn new(pin: &str, kdf_params: KdfParams) -> Result<Self> {
        let key_salt = Salt::generate()?;
        let pin = PinVerificationRecord::create(pin)?;

        Ok(Self {
            version: VaultVersion::CURRENT,
            key_salt,
            kdf_params,
            pin,
            created_at: Utc::now(),
        })
    }

    /// Verify a PIN against this configuration.
    ///
    /// A true result authorizes proceeding to master-key derivation; it is
    /// not itself proof of key validity.
    ///
    /// # Errors
    /// - PIN empty
    pub fn verify_pin(&self, pin: &str) -> Result<bool> {
        self.pin.verify(pin)
    }

    /// Serialize configuration to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_version_compatibility() {
        let current = VaultVersion::CURRENT;
        assert!(current.is_compatible());

        let incompatible = VaultVersion { major: 2, minor: 0 };
        assert!(!incompatible.is_compatible());
    }

    #[test]
    fn test_config_creation_and_verification() {
        let config = VaultConfig::new("123456", KdfParams::verification()).unwrap();

        assert!(config.verify_pin("123456").unwrap());
        assert!(!config.verify_pin("000000").unwrap());
    }

    #[test]
    fn test_salts_are_independent() {
        let config = VaultConfig::new("123456", KdfParams::verification()).unwrap();
        assert_ne!(config.key_salt, config.pin.salt);
    }

    #[test]
    fn test_config_serialization() {
        let config = VaultConfig::new("123456", KdfParams::verification()).unwrap();

        let json = config.to_json().unwrap();
        let restored = VaultConfig::from_json(&json).unwrap();

        assert_eq!(restored.key_salt, config.key_salt);
        assert_eq!(restored.pin, config.pin);
        assert!(restored.verify_pin("123456").unwrap());
    }
}
