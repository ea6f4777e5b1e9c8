//! Cryptographic primitives for ShardVault.
//!
//! This module provides:
//! - Master key derivation from a PIN using Argon2id
//! - PIN verification with an independent, cheaper cost tier
//! - Authenticated document encryption with per-document key wrapping
//! - Fail-closed secure randomness
//!
//! # Security Guarantees
//! - All key material is automatically zeroized on drop
//! - No plaintext or key material is ever logged
//! - Constant-time operations for sensitive comparisons
//! - Randomness comes from the OS source only; there is no fallback to a
//!   non-cryptographic generator

pub mod cipher;
pub mod kdf;
pub mod keys;
pub mod pin;
pub mod random;

pub use cipher::{decrypt_document, encrypt_document, rewrap_fek, EncryptedDocument, Iv,
    IV_LENGTH, TAG_LENGTH};
pub use kdf::{derive_master_key, KdfParams};
pub use keys::{FileEncryptionKey, MasterKey, Salt, KEY_LENGTH, SALT_LENGTH};
pub use pin::{hash_pin, verify_pin, PinVerificationRecord, PIN_HASH_LENGTH};
pub use random::{generate_iv, generate_random_bytes};
