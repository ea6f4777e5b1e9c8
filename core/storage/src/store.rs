//! Blob store trait definition.

use async_trait::async_trait;

use shardvault_common::{AccountId, FragmentId, Result};

/// Remote blob store for encrypted fragments.
///
/// Implementations must handle their own authentication, rate limiting,
/// and retry/backoff policy; this core aborts on the first failure it sees.
/// Blobs are ciphertext fragments only; implementations never receive
/// plaintext, keys, or document-level metadata.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Get the store name (e.g., "memory", "s3").
    fn name(&self) -> &str;

    /// Store a fragment blob under the account namespace.
    ///
    /// # Postconditions
    /// - The blob is retrievable via `get_blob` with the same id
    ///
    /// # Errors
    /// - Network/I/O errors
    /// - Authentication errors
    async fn put_blob(&self, account: &AccountId, id: &FragmentId, data: Vec<u8>) -> Result<()>;

    /// Retrieve a fragment blob.
    ///
    /// # Errors
    /// - Blob not found
    /// - Network/I/O errors
    async fn get_blob(&self, account: &AccountId, id: &FragmentId) -> Result<Vec<u8>>;

    /// Delete a set of fragment blobs.
    ///
    /// # Errors
    /// - Any blob not found
    /// - Network/I/O errors
    async fn delete_blobs(&self, account: &AccountId, ids: &[FragmentId]) -> Result<()>;
}
