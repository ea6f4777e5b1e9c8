//! In-memory blob store for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

use shardvault_common::{AccountId, Error, FragmentId, Result};

use crate::store::BlobStore;

/// In-memory blob store.
///
/// Useful for testing and development. All data is stored in memory and
/// lost on drop.
#[derive(Clone)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryBlobStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self {
            blobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn key(account: &AccountId, id: &FragmentId) -> String {
        format!("{}/{}", account, id)
    }

    /// Number of blobs currently stored.
    pub fn blob_count(&self) -> usize {
        self.blobs.read().unwrap().len()
    }

    /// Remove a blob directly, bypassing the trait.
    ///
    /// Lets tests simulate remote fragment loss.
    pub fn remove_blob(&self, account: &AccountId, id: &FragmentId) {
        self.blobs.write().unwrap().remove(&Self::key(account, id));
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn put_blob(&self, account: &AccountId, id: &FragmentId, data: Vec<u8>) -> Result<()> {
        debug!(fragment = %id, size = data.len(), "Storing blob");
        self.blobs
            .write()
            .unwrap()
            .insert(Self::key(account, id), data);
        Ok(())
    }

    async fn get_blob(&self, account: &AccountId, id: &FragmentId) -> Result<Vec<u8>> {
        self.blobs
            .read()
            .unwrap()
            .get(&Self::key(account, id))
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Blob not found: {}", id)))
    }

    async fn delete_blobs(&self, account: &AccountId, ids: &[FragmentId]) -> Result<()> {
        let mut blobs = self.blobs.write().unwrap();
        for id in ids {
            if blobs.remove(&Self::key(account, id)).is_none() {
                return Err(Error::NotFound(format!("Blob not found: {}", id)));
            }
        }
        debug!(count = ids.len(), "Deleted blobs");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn account() -> AccountId {
        AccountId::new("acct-1").unwrap()
    }

    fn fragment_id() -> FragmentId {
        FragmentId::new(Uuid::new_v4().to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let store = MemoryBlobStore::new();
        let account = account();
        let id = fragment_id();
        let data = vec![1, 2, 3];

        store.put_blob(&account, &id, data.clone()).await.unwrap();
        assert_eq!(store.get_blob(&account, &id).await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_get_missing_fails() {
        let store = MemoryBlobStore::new();
        let result = store.get_blob(&account(), &fragment_id()).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_accounts_are_namespaced() {
        let store = MemoryBlobStore::new();
        let id = fragment_id();
        let other = AccountId::new("acct-2").unwrap();

        store.put_blob(&account(), &id, vec![1]).await.unwrap();
        assert!(store.get_blob(&other, &id).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_blobs() {
        let store = MemoryBlobStore::new();
        let account = account();
        let ids = [fragment_id(), fragment_id()];

        for id in &ids {
            store.put_blob(&account, id, vec![0]).await.unwrap();
        }
        store.delete_blobs(&account, &ids).await.unwrap();

        assert_eq!(store.blob_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_missing_fails() {
        let store = MemoryBlobStore::new();
        let result = store.delete_blobs(&account(), &[fragment_id()]).await;
        assert!(result.is_err());
    }
}
