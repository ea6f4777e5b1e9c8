//! Document metadata and the ciphertext envelope.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shardvault_common::{DocumentId, Error, FragmentId, Result};
use shardvault_crypto::{Iv, IV_LENGTH};

/// Serialized form of `{encrypted_data, data_iv}`.
///
/// This is what gets fragmented and shipped to the blob store. JSON with
/// base64 payloads is fine here: the content is ciphertext, so the envelope
/// leaks nothing beyond total size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CiphertextEnvelope {
    /// Base64 of the AEAD-encrypted document bytes.
    data: String,
    /// Base64 of the 96-bit data IV.
    data_iv: String,
}

impl CiphertextEnvelope {
    /// Build an envelope from raw ciphertext and IV.
    pub fn new(encrypted_data: &[u8], data_iv: &Iv) -> Self {
        Self {
            data: STANDARD.encode(encrypted_data),
            data_iv: STANDARD.encode(data_iv),
        }
    }

    /// Serialize the envelope to bytes for fragmentation.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Parse an envelope from reassembled fragment bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Decode the ciphertext and IV back out of the envelope.
    ///
    /// # Errors
    /// - Malformed base64 or an IV that is not exactly 12 bytes
    pub fn decode(&self) -> Result<(Vec<u8>, Iv)> {
        let encrypted_data = STANDARD
            .decode(&self.data)
            .map_err(|e| Error::Serialization(format!("Invalid envelope data: {}", e)))?;
        let iv_bytes = STANDARD
            .decode(&self.data_iv)
            .map_err(|e| Error::Serialization(format!("Invalid envelope IV: {}", e)))?;

        if iv_bytes.len() != IV_LENGTH {
            return Err(Error::Serialization(format!(
                "Invalid envelope IV length: expected {}, got {}",
                IV_LENGTH,
                iv_bytes.len()
            )));
        }
        let mut data_iv = [0u8; IV_LENGTH];
        data_iv.copy_from_slice(&iv_bytes);

        Ok((encrypted_data, data_iv))
    }
}

/// A fragment's id/index pair as recorded in document metadata.
///
/// This pairing is the only place the positional index exists; the blob
/// store never sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentRef {
    pub id: FragmentId,
    pub index: u32,
}

/// Durable record linking a document to its fragments.
///
/// Contains no plaintext and no unwrapped key. Owned by the local device;
/// created at successful upload completion, immutable once written,
/// destroyed when the user deletes the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Unique document identifier.
    pub document_id: DocumentId,
    /// Original file name.
    pub name: String,
    /// MIME type of the original file.
    pub mime_type: String,
    /// Original file size in bytes.
    pub size: u64,
    /// Upload completion timestamp.
    pub created_at: DateTime<Utc>,
    /// FEK wrapped under the master key.
    pub encrypted_fek: Vec<u8>,
    /// IV used for the FEK wrap.
    pub fek_iv: Iv,
    /// IV used for the document body (also carried in the envelope).
    pub data_iv: Iv,
    /// Fragment id/index pairs, in index order.
    pub fragments: Vec<FragmentRef>,
}

impl DocumentMetadata {
    /// Fragment ids in index order, for deletion.
    pub fn fragment_ids(&self) -> Vec<FragmentId> {
        self.fragments.iter().map(|f| f.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_roundtrip() {
        let data = vec![0xDE, 0xAD, 0xBE, 0xEF];
        let iv = [7u8; IV_LENGTH];

        let envelope = CiphertextEnvelope::new(&data, &iv);
        let bytes = envelope.to_bytes().unwrap();
        let (decoded_data, decoded_iv) = CiphertextEnvelope::from_bytes(&bytes)
            .unwrap()
            .decode()
            .unwrap();

        assert_eq!(decoded_data, data);
        assert_eq!(decoded_iv, iv);
    }

    #[test]
    fn test_envelope_malformed_bytes_fails() {
        assert!(CiphertextEnvelope::from_bytes(b"not json").is_err());
    }

    #[test]
    fn test_envelope_bad_iv_length_fails() {
        let envelope = CiphertextEnvelope {
            data: STANDARD.encode([1, 2, 3]),
            data_iv: STANDARD.encode([0u8; 4]),
        };
        assert!(envelope.decode().is_err());
    }

    #[test]
    fn test_metadata_serde_roundtrip() {
        let metadata = DocumentMetadata {
            document_id: DocumentId::new("doc-1").unwrap(),
            name: "statement.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size: 11,
            created_at: Utc::now(),
            encrypted_fek: vec![0u8; 48],
            fek_iv: [1u8; IV_LENGTH],
            data_iv: [2u8; IV_LENGTH],
            fragments: vec![
                FragmentRef {
                    id: FragmentId::new("frag-a").unwrap(),
                    index: 0,
                },
                FragmentRef {
                    id: FragmentId::new("frag-b").unwrap(),
                    index: 1,
                },
            ],
        };

        let json = serde_json::to_string(&metadata).unwrap();
        let restored: DocumentMetadata = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.document_id, metadata.document_id);
        assert_eq!(restored.fragments, metadata.fragments);
        assert_eq!(restored.fek_iv, metadata.fek_iv);
    }

    #[test]
    fn test_fragment_ids_order() {
        let metadata = DocumentMetadata {
            document_id: DocumentId::new("doc-1").unwrap(),
            name: "a".to_string(),
            mime_type: "text/plain".to_string(),
            size: 1,
            created_at: Utc::now(),
            encrypted_fek: vec![],
            fek_iv: [0u8; IV_LENGTH],
            data_iv: [0u8; IV_LENGTH],
            fragments: vec![
                FragmentRef {
                    id: FragmentId::new("x").unwrap(),
                    index: 0,
                },
                FragmentRef {
                    id: FragmentId::new("y").unwrap(),
                    index: 1,
                },
            ],
        };

        let ids = metadata.fragment_ids();
        assert_eq!(ids[0].as_str(), "x");
        assert_eq!(ids[1].as_str(), "y");
    }
}
