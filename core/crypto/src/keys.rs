//! Key types with secure memory handling.
//!
//! All key types automatically zeroize their memory on drop to prevent
//! sensitive data from persisting in memory.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use shardvault_common::Result;

use crate::random;

/// Length of encryption keys in bytes (256-bit).
pub const KEY_LENGTH: usize = 32;

/// Length of key-derivation salts in bytes (128-bit).
pub const SALT_LENGTH: usize = 16;

/// Master key derived from the user's PIN.
///
/// The root of the key hierarchy: it never encrypts document bytes directly,
/// only wraps per-document file encryption keys. Exactly one MasterKey is
/// live per unlocked session; it exists only in process memory and is never
/// persisted in any form.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    key: [u8; KEY_LENGTH],
}

impl MasterKey {
    /// Create a master key from raw bytes.
    pub fn from_bytes(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Get the key bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MasterKey([REDACTED])")
    }
}

/// Per-document File Encryption Key (FEK).
///
/// Generated fresh for every uploaded document, exists in plaintext only
/// transiently during encryption, and is persisted only in wrapped
/// (encrypted-under-MasterKey) form.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct FileEncryptionKey {
    key: [u8; KEY_LENGTH],
}

impl FileEncryptionKey {
    /// Create a file encryption key from raw bytes.
    pub fn from_bytes(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Generate a random file encryption key.
    ///
    /// # Errors
    /// - Returns error if the OS randomness source fails
    pub fn generate() -> Result<Self> {
        let mut key = [0u8; KEY_LENGTH];
        random::fill_random(&mut key)?;
        Ok(Self { key })
    }

    /// Get the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl fmt::Debug for FileEncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileEncryptionKey([REDACTED])")
    }
}

/// Salt for key derivation.
///
/// Generated once at vault setup, persisted (non-secret) alongside the
/// account, and immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salt(pub [u8; SALT_LENGTH]);

impl Salt {
    /// Generate a random salt.
    ///
    /// # Errors
    /// - Returns error if the OS randomness source fails
    pub fn generate() -> Result<Self> {
        let mut salt = [0u8; SALT_LENGTH];
        random::fill_random(&mut salt)?;
        Ok(Self(salt))
    }

    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; SALT_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Create from a byte slice.
    ///
    /// # Errors
    /// - Returns error if the slice is not exactly SALT_LENGTH bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SALT_LENGTH {
            return Err(shardvault_common::Error::InvalidInput(format!(
                "Invalid salt length: expected {}, got {}",
                SALT_LENGTH,
                bytes.len()
            )));
        }
        let mut salt = [0u8; SALT_LENGTH];
        salt.copy_from_slice(bytes);
        Ok(Self(salt))
    }

    /// Get the salt bytes.
    pub fn as_bytes(&self) -> &[u8; SALT_LENGTH] {
        &self.0
    }
}
