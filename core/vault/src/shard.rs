//! Ciphertext fragmentation and reassembly.
//!
//! An encrypted blob is split into a fixed number of equal-size fragments,
//! each stored under a random identifier with no relation to document
//! identity or content. The remote store cannot infer document boundaries,
//! size distribution beyond the blob total, or fragment relationships from
//! names alone. This is obfuscation, not error correction: losing any one
//! fragment loses the document.

use uuid::Uuid;

use shardvault_common::{Error, FragmentId, Result};

/// Fixed number of fragments per document.
pub const SHARD_COUNT: usize = 3;

/// One positionally-indexed slice of a ciphertext blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Random identifier, unrelated to the document.
    pub id: FragmentId,
    /// Contiguous slice of the ciphertext blob. May be empty for the
    /// trailing fragments of very small blobs.
    pub payload: Vec<u8>,
    /// Position for reassembly, in [0, SHARD_COUNT).
    pub index: u32,
}

/// Split a ciphertext blob into `SHARD_COUNT` fragments.
///
/// Parts are `ceil(len / SHARD_COUNT)` bytes each except the final part,
/// which holds the remainder.
///
/// # Postconditions
/// - Exactly `SHARD_COUNT` fragments with indices 0..SHARD_COUNT
/// - Payload lengths sum to `blob.len()`
/// - Fragment ids are fresh random UUIDs
pub fn split_into_shards(blob: &[u8]) -> Result<Vec<Fragment>> {
    let part_size = blob.len().div_ceil(SHARD_COUNT);

    let mut fragments = Vec::with_capacity(SHARD_COUNT);
    for i in 0..SHARD_COUNT {
        let start = (i * part_size).min(blob.len());
        let end = ((i + 1) * part_size).min(blob.len());

        fragments.push(Fragment {
            id: FragmentId::new(Uuid::new_v4().to_string())?,
            payload: blob[start..end].to_vec(),
            index: i as u32,
        });
    }

    Ok(fragments)
}

/// Reassemble fragments back into the ciphertext blob.
///
/// # Preconditions
/// - Exactly `SHARD_COUNT` fragments with indices forming the contiguous
///   set {0, ..., SHARD_COUNT-1}; order of the input does not matter
///
/// # Errors
/// - Count mismatch, or a duplicate/missing index; the error names the
///   mismatch, and a partial set never yields truncated data silently
pub fn reassemble_shards(fragments: Vec<Fragment>) -> Result<Vec<u8>> {
    if fragments.len() != SHARD_COUNT {
        return Err(Error::Fragment(format!(
            "Expected {} fragments, got {}",
            SHARD_COUNT,
            fragments.len()
        )));
    }

    let mut sorted = fragments;
    sorted.sort_by_key(|f| f.index);

    for (i, fragment) in sorted.iter().enumerate() {
        if fragment.index != i as u32 {
            return Err(Error::Fragment(format!(
                "Missing fragment at index {}",
                i
            )));
        }
    }

    let total: usize = sorted.iter().map(|f| f.payload.len()).sum();
    let mut blob = Vec::with_capacity(total);
    for fragment in sorted {
        blob.extend_from_slice(&fragment.payload);
    }

    Ok(blob)
}
