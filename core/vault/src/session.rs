//! Vault session management.
//!
//! A session is the scoped credential holding the master key: created at
//! unlock by verifying the PIN record and re-deriving the key, read-only
//! while operations run, and wiped at lock or drop. There is no ambient
//! global key; callers pass the session's key to the pipeline explicitly.

use tracing::{debug, info};
use uuid::Uuid;

use shardvault_common::{Error, Result};
use shardvault_crypto::{derive_master_key, rewrap_fek, Iv, MasterKey};

use crate::config::VaultConfig;

/// Session handle for tracking active sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionHandle(String);

impl SessionHandle {
    /// Generate a new unique session handle.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the handle string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// State of the vault session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Session is active and the master key is available.
    Active,
    /// Session is locked, the key has been cleared.
    Locked,
}

/// Active vault session.
///
/// Holds the one live master key for the unlocked vault. The key is
/// zeroized when the session is locked or dropped. Concurrent
/// encrypt/decrypt calls reading the same key are safe; the key is
/// immutable for the session's duration.
pub struct VaultSession {
    /// Unique session identifier.
    handle: SessionHandle,
    /// Vault configuration.
    config: VaultConfig,
    /// Master key (zeroized on drop).
    master_key: Option<MasterKey>,
    /// Session state.
    state: SessionState,
}

impl VaultSession {
    /// Unlock the vault with a PIN.
    ///
    /// Verifies the PIN against the stored verification record, then
    /// derives the master key from (PIN, key salt). A verification match
    /// does not itself prove key validity: decrypting a document is the
    /// only full correctness check, and a decryption failure after a PIN
    /// match implies state corruption rather than a wrong PIN.
    ///
    /// # Errors
    /// - Incompatible vault version
    /// - PIN does not match the verification record
    /// - KDF failure
    pub fn unlock(config: VaultConfig, pin: &str) -> Result<Self> {
        if !config.version.is_compatible() {
            return Err(Error::NotPermitted(format!(
                "Incompatible vault version: {:?}",
                config.version
            )));
        }

        if !config.verify_pin(pin)? {
            return Err(Error::NotPermitted("Invalid PIN".to_string()));
        }

        let master_key = derive_master_key(pin, &config.key_salt, &config.kdf_params)?;

        let handle = SessionHandle::new();
        info!(session = handle.as_str(), "Vault unlocked");

        Ok(Self {
            handle,
            config,
            master_key: Some(master_key),
            state: SessionState::Active,
        })
    }

    /// Get the session handle.
    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    /// Get the vault configuration.
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Get the master key, if the session is active.
    ///
    /// # Errors
    /// - Returns error if the session is locked
    pub fn master_key(&self) -> Result<&MasterKey> {
        match self.state {
            SessionState::Active => self
                .master_key
                .as_ref()
                .ok_or_else(|| Error::NotPermitted("Master key not available".to_string())),
            SessionState::Locked => Err(Error::NotPermitted("Session is locked".to_string())),
        }
    }

    /// Get the current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Check if the session is active.
    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    /// Lock the session, clearing the key from memory.
    ///
    /// # Postconditions
    /// - Master key is zeroized and removed
    /// - Session can no longer perform operations
    pub fn lock(&mut self) {
        if let Some(key) = self.master_key.take() {
            // Zeroized on drop via ZeroizeOnDrop
            drop(key);
            debug!(session = self.handle.as_str(), "Vault locked");
        }
        self.state = SessionState::Locked;
    }

    /// Change the vault PIN.
    ///
    /// Rebuilds the configuration with fresh salts and derives the new
    /// master key. Existing documents stay decryptable only after their
    /// wrapped FEKs are re-wrapped with [`VaultSession::rewrap_document_key`];
    /// the caller drives that loop over its stored metadata.
    ///
    /// # Errors
    /// - Session is locked
    /// - Old PIN incorrect
    /// - New PIN empty
    pub fn change_pin(&mut self, old_pin: &str, new_pin: &str) -> Result<MasterKey> {
        if self.state != SessionState::Active {
            return Err(Error::NotPermitted("Session is locked".to_string()));
        }

        if !self.config.verify_pin(old_pin)? {
            return Err(Error::NotPermitted("Invalid PIN".to_string()));
        }

        // Build the new credentials before touching the old key, so a
        // failure (e.g. empty new PIN) leaves the session intact.
        let new_config = VaultConfig::new(new_pin, self.config.kdf_params.clone())?;
        let new_key = derive_master_key(new_pin, &new_config.key_salt, &new_config.kdf_params)?;

        let old_key = self
            .master_key
            .take()
            .ok_or_else(|| Error::NotPermitted("Master key not available".to_string()))?;

        self.config = new_config;
        self.master_key = Some(new_key);

        info!(session = self.handle.as_str(), "PIN changed");
        Ok(old_key)
    }

    /// Re-wrap one document's FEK under this session's current master key.
    ///
    /// `old_key` is the key returned by [`VaultSession::change_pin`];
    /// document bodies are not touched.
    pub fn rewrap_document_key(
        &self,
        encrypted_fek: &[u8],
        fek_iv: &Iv,
        old_key: &MasterKey,
    ) -> Result<(Vec<u8>, Iv)> {
        rewrap_fek(encrypted_fek, fek_iv, old_key, self.master_key()?)
    }
}

impl Drop for VaultSession {
    fn drop(&mut self) {
        // Ensure the key is zeroized
        self.lock();
    }
}
