//! Vault engine for ShardVault.
//!
//! This module provides:
//! - Vault configuration (salts, KDF parameters, PIN verification record)
//! - Session handling with secure key management
//! - Ciphertext fragmentation and reassembly
//! - The upload/download/delete pipeline over an external blob store
//!
//! # Architecture
//! The vault module sits between the caller and the blob store, sequencing
//! Key Derivation → Document Cipher → Fragmenter → blob transfer for
//! writes, and the mirror sequence for reads. The master key lives in a
//! scoped [`VaultSession`] and is wiped on lock.

pub mod config;
pub mod document;
pub mod pipeline;
pub mod session;
pub mod shard;

pub use config::{VaultConfig, VaultVersion};
pub use document::{CiphertextEnvelope, DocumentMetadata, FragmentRef};
pub use pipeline::{PipelineError, PipelineStage, Progress, ProgressFn, VaultPipeline};
pub use session::{SessionHandle, SessionState, VaultSession};
pub use shard::{reassemble_shards, split_into_shards, Fragment, SHARD_COUNT};
