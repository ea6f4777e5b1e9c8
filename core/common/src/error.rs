//! Common error types for ShardVault.
//!
//! Every pipeline stage returns a tagged failure from this taxonomy rather
//! than raising through unrelated layers. Messages must never contain key
//! material, PIN text, or raw cryptographic bytes.

use thiserror::Error;

/// Top-level error type for ShardVault operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid input provided (empty/oversized file, malformed salt, bad id).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Cryptographic operation failed.
    ///
    /// Authentication failures on decrypt/unwrap are never distinguished
    /// further; callers see only "wrong key or corrupted data".
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// Incomplete or malformed fragment set on reassembly.
    #[error("Fragment error: {0}")]
    Fragment(String),

    /// Blob store transfer failed; propagated opaquely from the collaborator.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Operation not permitted (e.g., session is locked).
    #[error("Not permitted: {0}")]
    NotPermitted(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
