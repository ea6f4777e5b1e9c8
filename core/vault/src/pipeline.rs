//! Upload/download/delete orchestration.
//!
//! Sequences Key Derivation → Document Cipher → Fragmenter → blob transfer
//! for writes and the mirror sequence for reads. Stages run sequentially
//! per operation; fragment transfers are sequential within the transfer
//! stage (bounded by `SHARD_COUNT`, so no worker pool is warranted). The
//! first failure aborts the pipeline with a stage-tagged error; already
//! uploaded fragments are not cleaned up; retry and compensation policy
//! belong to the storage collaborator.

use std::fmt;
use std::sync::Arc;
use thiserror::Error as ThisError;
use tracing::{debug, info};
use uuid::Uuid;

use shardvault_common::{AccountId, DocumentId, Error, SensitiveBytes};
use shardvault_crypto::{decrypt_document, encrypt_document, MasterKey};
use shardvault_storage::BlobStore;

use crate::document::{CiphertextEnvelope, DocumentMetadata, FragmentRef};
use crate::shard::{reassemble_shards, split_into_shards, Fragment};

/// Default upper bound on document size (50 MiB).
pub const DEFAULT_MAX_DOCUMENT_SIZE: u64 = 50 * 1024 * 1024;

/// Pipeline stage, used for progress reporting and error tagging.
///
/// Downloads report the mirror sequence (`Uploading` covers fragment
/// transfer in both directions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Encrypting,
    Sharding,
    Uploading,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Encrypting => write!(f, "encrypting"),
            PipelineStage::Sharding => write!(f, "sharding"),
            PipelineStage::Uploading => write!(f, "uploading"),
        }
    }
}

/// Progress report for a pipeline operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub stage: PipelineStage,
    /// 0-100 within the current stage.
    pub percent: u8,
    /// Set during the transfer stage.
    pub current_fragment: Option<u32>,
    /// Set during the transfer stage.
    pub total_fragments: Option<u32>,
}

/// Progress callback type.
pub type ProgressFn = dyn Fn(Progress) + Send + Sync;

/// Stage-tagged pipeline failure.
///
/// The message is human-readable and never contains key material, PIN
/// text, or raw cryptographic bytes.
#[derive(Debug, ThisError)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: PipelineStage,
    #[source]
    pub source: Error,
}

fn tag(stage: PipelineStage) -> impl Fn(Error) -> PipelineError {
    move |source| PipelineError { stage, source }
}

fn report(
    progress: Option<&ProgressFn>,
    stage: PipelineStage,
    percent: u8,
    current_fragment: Option<u32>,
    total_fragments: Option<u32>,
) {
    if let Some(callback) = progress {
        callback(Progress {
            stage,
            percent,
            current_fragment,
            total_fragments,
        });
    }
}

/// Vault pipeline over an external blob store.
///
/// Holds no key material; the caller passes the session's master key into
/// each operation explicitly.
pub struct VaultPipeline {
    store: Arc<dyn BlobStore>,
    max_document_size: u64,
}

impl VaultPipeline {
    /// Create a pipeline over a blob store.
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            store,
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
        }
    }

    /// Override the maximum accepted document size.
    pub fn with_max_document_size(mut self, max: u64) -> Self {
        self.max_document_size = max;
        self
    }

    /// Encrypt, fragment, and upload a document.
    ///
    /// # Postconditions
    /// - All `SHARD_COUNT` fragments are stored under random ids
    /// - The returned metadata is the only durable link between the
    ///   document and its fragments; it holds no plaintext or unwrapped key
    ///
    /// # Errors
    /// - Stage-tagged: empty/oversized input (encrypting), envelope or
    ///   split failure (sharding), blob transfer failure (uploading).
    ///   Fragments already uploaded before a failure are left in place.
    pub async fn upload(
        &self,
        bytes: &[u8],
        name: &str,
        mime_type: &str,
        master_key: &MasterKey,
        account: &AccountId,
        progress: Option<&ProgressFn>,
    ) -> Result<DocumentMetadata, PipelineError> {
        report(progress, PipelineStage::Encrypting, 0, None, None);

        if bytes.is_empty() {
            return Err(tag(PipelineStage::Encrypting)(Error::InvalidInput(
                "File is empty".to_string(),
            )));
        }
        if bytes.len() as u64 > self.max_document_size {
            return Err(tag(PipelineStage::Encrypting)(Error::InvalidInput(format!(
                "File exceeds maximum size of {} bytes",
                self.max_document_size
            ))));
        }

        debug!(size = bytes.len(), "Encrypting document");
        let encrypted = encrypt_document(bytes, master_key).map_err(tag(PipelineStage::Encrypting))?;
        report(progress, PipelineStage::Encrypting, 60, None, None);

        let envelope = CiphertextEnvelope::new(&encrypted.encrypted_data, &encrypted.data_iv);
        let blob = envelope.to_bytes().map_err(tag(PipelineStage::Sharding))?;
        report(progress, PipelineStage::Sharding, 70, None, None);

        let fragments = split_into_shards(&blob).map_err(tag(PipelineStage::Sharding))?;
        report(progress, PipelineStage::Sharding, 80, None, None);

        let total = fragments.len() as u32;
        let refs: Vec<FragmentRef> = fragments
            .iter()
            .map(|f| FragmentRef {
                id: f.id.clone(),
                index: f.index,
            })
            .collect();

        report(progress, PipelineStage::Uploading, 0, Some(0), Some(total));
        for (i, fragment) in fragments.into_iter().enumerate() {
            self.store
                .put_blob(account, &fragment.id, fragment.payload)
                .await
                .map_err(tag(PipelineStage::Uploading))?;

            let done = (i + 1) as u32;
            report(
                progress,
                PipelineStage::Uploading,
                (done * 100 / total) as u8,
                Some(done),
                Some(total),
            );
        }

        let document_id = DocumentId::new(Uuid::new_v4().to_string())
            .map_err(tag(PipelineStage::Uploading))?;

        info!(
            document = document_id.as_str(),
            size = bytes.len(),
            fragments = total,
            store = self.store.name(),
            "Document uploaded"
        );

        Ok(DocumentMetadata {
            document_id,
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            size: bytes.len() as u64,
            created_at: chrono::Utc::now(),
            encrypted_fek: encrypted.encrypted_fek,
            fek_iv: encrypted.fek_iv,
            data_iv: encrypted.data_iv,
            fragments: refs,
        })
    }

    /// Fetch, reassemble, and decrypt a document.
    ///
    /// The returned buffer zeroizes on drop; the caller should dispose of
    /// it promptly.
    pub async fn download(
        &self,
        metadata: &DocumentMetadata,
        master_key: &MasterKey,
        account: &AccountId,
        progress: Option<&ProgressFn>,
    ) -> Result<SensitiveBytes, PipelineError> {
        let total = metadata.fragments.len() as u32;
        report(progress, PipelineStage::Uploading, 0, Some(0), Some(total));

        let mut fragments = Vec::with_capacity(metadata.fragments.len());
        for (i, fragment_ref) in metadata.fragments.iter().enumerate() {
            let payload = self
                .store
                .get_blob(account, &fragment_ref.id)
                .await
                .map_err(tag(PipelineStage::Uploading))?;

            fragments.push(Fragment {
                id: fragment_ref.id.clone(),
                payload,
                index: fragment_ref.index,
            });

            let done = (i + 1) as u32;
            report(
                progress,
                PipelineStage::Uploading,
                (done * 100 / total) as u8,
                Some(done),
                Some(total),
            );
        }

        report(progress, PipelineStage::Sharding, 50, None, None);
        let blob = reassemble_shards(fragments).map_err(tag(PipelineStage::Sharding))?;
        let envelope = CiphertextEnvelope::from_bytes(&blob).map_err(tag(PipelineStage::Sharding))?;
        let (encrypted_data, data_iv) = envelope.decode().map_err(tag(PipelineStage::Sharding))?;

        report(progress, PipelineStage::Encrypting, 75, None, None);
        let plaintext = decrypt_document(
            &encrypted_data,
            &metadata.encrypted_fek,
            &metadata.fek_iv,
            &data_iv,
            master_key,
        )
        .map_err(tag(PipelineStage::Encrypting))?;
        report(progress, PipelineStage::Encrypting, 100, None, None);

        debug!(
            document = metadata.document_id.as_str(),
            size = plaintext.len(),
            "Document downloaded"
        );

        Ok(SensitiveBytes::new(plaintext))
    }

    /// Delete a document's fragments from the blob store.
    ///
    /// Local metadata removal is the caller's responsibility.
    pub async fn delete(
        &self,
        metadata: &DocumentMetadata,
        account: &AccountId,
    ) -> Result<(), PipelineError> {
        self.store
            .delete_blobs(account, &metadata.fragment_ids())
            .await
            .map_err(tag(PipelineStage::Uploading))?;

        info!(
            document = metadata.document_id.as_str(),
            "Document fragments deleted"
        );
        Ok(())
    }
}
