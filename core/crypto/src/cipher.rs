//! Authenticated document encryption with per-document key wrapping.
//!
//! ChaCha20-Poly1305 (96-bit nonce, 128-bit tag) provides confidentiality
//! and integrity in one pass. Each document is encrypted under a fresh
//! random File Encryption Key (FEK); the FEK itself is wrapped under the
//! master key, so the master key never touches bulk data and existing
//! documents can be re-wrapped under a new master key without re-encrypting
//! their bodies.

use chacha20poly1305::{
    aead::{generic_array::GenericArray, Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use zeroize::Zeroize;

use shardvault_common::{Error, Result};

use crate::keys::{FileEncryptionKey, MasterKey, KEY_LENGTH};
use crate::random::generate_iv;

/// Nonce size for ChaCha20-Poly1305 (12 bytes, 96-bit).
pub const IV_LENGTH: usize = 12;

/// Authentication tag size (16 bytes, 128-bit).
pub const TAG_LENGTH: usize = 16;

/// A 96-bit initialization vector.
pub type Iv = [u8; IV_LENGTH];

/// Fixed message for all authentication failures.
///
/// Never distinguished further ("bad tag" vs "bad wrap" vs "bad length")
/// to avoid acting as a decryption oracle.
const DECRYPT_FAILED: &str = "Decryption failed: wrong key or corrupted data";

/// Result of encrypting a document.
///
/// Contains ciphertext and non-secret IVs only; the plaintext FEK is
/// dropped before this value is returned.
#[derive(Debug, Clone)]
pub struct EncryptedDocument {
    /// Document bytes encrypted under the FEK (includes the 16-byte tag).
    pub encrypted_data: Vec<u8>,
    /// IV used for the document body.
    pub data_iv: Iv,
    /// FEK encrypted under the master key (includes the 16-byte tag).
    pub encrypted_fek: Vec<u8>,
    /// IV used for the FEK wrap.
    pub fek_iv: Iv,
}

fn seal(key: &[u8; KEY_LENGTH], iv: &Iv, plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new(GenericArray::from_slice(key));
    cipher
        .encrypt(Nonce::from_slice(iv), plaintext)
        .map_err(|_| Error::Crypto("Encryption failed".to_string()))
}

fn open(key: &[u8; KEY_LENGTH], iv: &Iv, ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.len() < TAG_LENGTH {
        return Err(Error::Crypto(DECRYPT_FAILED.to_string()));
    }
    let cipher = ChaCha20Poly1305::new(GenericArray::from_slice(key));
    cipher
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| Error::Crypto(DECRYPT_FAILED.to_string()))
}

/// Encrypt document bytes under a fresh FEK and wrap the FEK under the
/// master key.
///
/// # Postconditions
/// - `encrypted_data.len() == plaintext.len() + TAG_LENGTH`
/// - `encrypted_fek.len() == KEY_LENGTH + TAG_LENGTH`
/// - Both IVs are fresh random values
///
/// # Errors
/// - Returns error if the OS randomness source fails
/// - Returns error if encryption fails
///
/// # Security
/// - The plaintext FEK is zeroized when this call returns
/// - Repeated encryption of the same plaintext yields different output
pub fn encrypt_document(plaintext: &[u8], master_key: &MasterKey) -> Result<EncryptedDocument> {
    let fek = FileEncryptionKey::generate()?;
    let data_iv = generate_iv()?;
    let encrypted_data = seal(fek.as_bytes(), &data_iv, plaintext)?;

    let fek_iv = generate_iv()?;
    let encrypted_fek = seal(master_key.as_bytes(), &fek_iv, fek.as_bytes())?;

    Ok(EncryptedDocument {
        encrypted_data,
        data_iv,
        encrypted_fek,
        fek_iv,
    })
}

/// Unwrap a FEK using the master key.
fn unwrap_fek(encrypted_fek: &[u8], fek_iv: &Iv, master_key: &MasterKey) -> Result<FileEncryptionKey> {
    let mut fek_bytes = open(master_key.as_bytes(), fek_iv, encrypted_fek)?;
    if fek_bytes.len() != KEY_LENGTH {
        return Err(Error::Crypto(DECRYPT_FAILED.to_string()));
    }
    let mut key = [0u8; KEY_LENGTH];
    key.copy_from_slice(&fek_bytes);
    fek_bytes.zeroize();
    Ok(FileEncryptionKey::from_bytes(key))
}

/// Decrypt document bytes by unwrapping the FEK and opening the body.
///
/// # Errors
/// - Returns a single undistinguished crypto error when authentication
///   fails on either the FEK wrap or the document body (wrong key or
///   tampered data); no partial plaintext is ever produced
///
/// # Security
/// - The caller is responsible for disposing of the plaintext promptly
pub fn decrypt_document(
    encrypted_data: &[u8],
    encrypted_fek: &[u8],
    fek_iv: &Iv,
    data_iv: &Iv,
    master_key: &MasterKey,
) -> Result<Vec<u8>> {
    let fek = unwrap_fek(encrypted_fek, fek_iv, master_key)?;
    open(fek.as_bytes(), data_iv, encrypted_data)
}

/// Re-wrap a FEK under a new master key with a fresh IV.
///
/// Used on PIN change: every document's wrapped FEK is re-wrapped under the
/// new master key while the document bodies stay untouched.
///
/// # Errors
/// - Returns error if the FEK does not authenticate under the old key
pub fn rewrap_fek(
    encrypted_fek: &[u8],
    fek_iv: &Iv,
    old_key: &MasterKey,
    new_key: &MasterKey,
) -> Result<(Vec<u8>, Iv)> {
    let fek = unwrap_fek(encrypted_fek, fek_iv, old_key)?;
    let new_iv = generate_iv()?;
    let wrapped = seal(new_key.as_bytes(), &new_iv, fek.as_bytes())?;
    Ok((wrapped, new_iv))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key(byte: u8) -> MasterKey {
        MasterKey::from_bytes([byte; KEY_LENGTH])
    }

    fn decrypt(doc: &EncryptedDocument, key: &MasterKey) -> Result<Vec<u8>> {
        decrypt_document(
            &doc.encrypted_data,
            &doc.encrypted_fek,
            &doc.fek_iv,
            &doc.data_iv,
            key,
        )
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = test_key(42);
        let plaintext = b"hello vault";

        let doc = encrypt_document(plaintext, &key).unwrap();
        let decrypted = decrypt(&doc, &key).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_output_sizes() {
        let key = test_key(42);
        let plaintext = b"sized";

        let doc = encrypt_document(plaintext, &key).unwrap();

        assert_eq!(doc.encrypted_data.len(), plaintext.len() + TAG_LENGTH);
        assert_eq!(doc.encrypted_fek.len(), KEY_LENGTH + TAG_LENGTH);
    }

    #[test]
    fn test_fresh_fek_and_ivs_each_call() {
        let key = test_key(42);
        let plaintext = b"same plaintext";

        let doc1 = encrypt_document(plaintext, &key).unwrap();
        let doc2 = encrypt_document(plaintext, &key).unwrap();

        assert_ne!(doc1.data_iv, doc2.data_iv);
        assert_ne!(doc1.fek_iv, doc2.fek_iv);
        assert_ne!(doc1.encrypted_data, doc2.encrypted_data);
        assert_ne!(doc1.encrypted_fek, doc2.encrypted_fek);
    }

    #[test]
    fn test_wrong_master_key_fails() {
        let doc = encrypt_document(b"secret", &test_key(1)).unwrap();
        assert!(decrypt(&doc, &test_key(2)).is_err());
    }

    #[test]
    fn test_tampered_encrypted_data_fails() {
        let key = test_key(42);
        let mut doc = encrypt_document(b"important", &key).unwrap();
        doc.encrypted_data[3] ^= 0x01;

        assert!(decrypt(&doc, &key).is_err());
    }

    #[test]
    fn test_tampered_encrypted_fek_fails() {
        let key = test_key(42);
        let mut doc = encrypt_document(b"important", &key).unwrap();
        doc.encrypted_fek[0] ^= 0x01;

        assert!(decrypt(&doc, &key).is_err());
    }

    #[test]
    fn test_tampered_data_iv_fails() {
        let key = test_key(42);
        let mut doc = encrypt_document(b"important", &key).unwrap();
        doc.data_iv[0] ^= 0x01;

        assert!(decrypt(&doc, &key).is_err());
    }

    #[test]
    fn test_tampered_fek_iv_fails() {
        let key = test_key(42);
        let mut doc = encrypt_document(b"important", &key).unwrap();
        doc.fek_iv[11] ^= 0x80;

        assert!(decrypt(&doc, &key).is_err());
    }

    #[test]
    fn test_failure_message_is_uniform() {
        let key = test_key(42);
        let mut tampered_body = encrypt_document(b"data", &key).unwrap();
        tampered_body.encrypted_data[0] ^= 0x01;
        let mut tampered_wrap = encrypt_document(b"data", &key).unwrap();
        tampered_wrap.encrypted_fek[0] ^= 0x01;

        let body_err = decrypt(&tampered_body, &key).unwrap_err().to_string();
        let wrap_err = decrypt(&tampered_wrap, &key).unwrap_err().to_string();

        assert_eq!(body_err, wrap_err);
    }

    #[test]
    fn test_empty_plaintext() {
        let key = test_key(42);
        let doc = encrypt_document(b"", &key).unwrap();
        assert_eq!(decrypt(&doc, &key).unwrap(), b"");
    }

    #[test]
    fn test_large_plaintext() {
        let key = test_key(42);
        let plaintext = vec![0xABu8; 1_000_000]; // 1 MB

        let doc = encrypt_document(&plaintext, &key).unwrap();
        assert_eq!(decrypt(&doc, &key).unwrap(), plaintext);
    }

    #[test]
    fn test_rewrap_fek() {
        let old_key = test_key(1);
        let new_key = test_key(2);
        let doc = encrypt_document(b"rotated", &old_key).unwrap();

        let (wrapped, new_iv) = rewrap_fek(&doc.encrypted_fek, &doc.fek_iv, &old_key, &new_key).unwrap();

        // Body untouched, decrypts under the new wrap
        let plaintext = decrypt_document(
            &doc.encrypted_data,
            &wrapped,
            &new_iv,
            &doc.data_iv,
            &new_key,
        )
        .unwrap();
        assert_eq!(plaintext, b"rotated");

        // Old key no longer unwraps the new wrap
        assert!(decrypt_document(&doc.encrypted_data, &wrapped, &new_iv, &doc.data_iv, &old_key).is_err());
    }

    #[test]
    fn test_rewrap_with_wrong_old_key_fails() {
        let doc = encrypt_document(b"rotated", &test_key(1)).unwrap();
        assert!(rewrap_fek(&doc.encrypted_fek, &doc.fek_iv, &test_key(9), &test_key(2)).is_err());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn roundtrip_any_plaintext(plaintext in proptest::collection::vec(any::<u8>(), 0..4096)) {
                let key = test_key(7);
                let doc = encrypt_document(&plaintext, &key).unwrap();
                prop_assert_eq!(decrypt(&doc, &key).unwrap(), plaintext);
            }
        }
    }
}
