//! Text sealing with ChaCha20-Poly1305.
//!
//! A sealed value is `base64(nonce || ciphertext || tag)`, which fits in any
//! text column.

use crate::error::{CryptoError, CryptoResult};
use crate::key::DerivedKey;
use base64::{engine::general_purpose::STANDARD, Engine};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;

/// Size of nonce in bytes (96 bits for ChaCha20-Poly1305).
pub const NONCE_SIZE: usize = 12;

/// Size of authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// A sealed text value before base64 encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedText {
    /// Fresh for every seal.
    pub nonce: [u8; NONCE_SIZE],
    /// Ciphertext with the auth tag appended.
    pub ciphertext: Vec<u8>,
}

impl SealedText {
    pub fn to_base64(&self) -> String {
        let mut bytes = Vec::with_capacity(NONCE_SIZE + self.ciphertext.len());
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        STANDARD.encode(&bytes)
    }

    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CryptoError::Malformed(format!("invalid base64: {e}")))?;

        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::Malformed(format!(
                "{} bytes is shorter than nonce and tag",
                bytes.len()
            )));
        }

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&bytes[..NONCE_SIZE]);
        Ok(Self {
            nonce,
            ciphertext: bytes[NONCE_SIZE..].to_vec(),
        })
    }
}

/// Seals `plaintext` under `key` and returns the base64 form.
pub fn seal_text(key: &DerivedKey, plaintext: &str) -> CryptoResult<String> {
    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    Ok(SealedText {
        nonce: nonce_bytes,
        ciphertext,
    }
    .to_base64())
}

/// Opens a value produced by [`seal_text`] with the same key.
pub fn open_text(key: &DerivedKey, sealed: &str) -> CryptoResult<String> {
    let sealed = SealedText::from_base64(sealed)?;
    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());

    let plaintext = cipher
        .decrypt(Nonce::from_slice(&sealed.nonce), sealed.ciphertext.as_ref())
        .map_err(|_| {
            CryptoError::Decryption("wrong key or tampered data".to_string())
        })?;

    String::from_utf8(plaintext)
        .map_err(|e| CryptoError::Decryption(format!("invalid UTF-8: {e}")))
}
