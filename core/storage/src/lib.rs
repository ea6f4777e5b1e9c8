//! Blob store abstraction for ShardVault.
//!
//! Fragments are addressed purely by (account namespace, random fragment
//! id); no path or filename semantics are exposed to this core. The remote
//! store sees opaque byte blobs under content-unrelated identifiers and
//! cannot infer document boundaries or relationships from them.
//!
//! # Design Principles
//! - Store isolation: no store-specific logic in vault or crypto modules
//! - Async operations: all I/O operations are async
//! - Unified error semantics: transport failures propagate opaquely

pub mod memory;
pub mod store;

pub use memory::MemoryBlobStore;
pub use store::BlobStore;
