//! Error types for the encryption layer.

use thiserror::Error;

/// Result type for low-level crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors from key derivation and the AEAD cipher.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key derivation failed.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Decryption failed (wrong key or tampered data).
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Sealed text is not valid base64 or is too short to hold a nonce and tag.
    #[error("malformed sealed text: {0}")]
    Malformed(String),
}

/// Result type for [`EncryptionProvider`](crate::EncryptionProvider) calls.
pub type EncryptorResult<T> = Result<T, EncryptorError>;

/// Errors surfaced by an encryption provider to the settings layer.
#[derive(Debug, Error)]
pub enum EncryptorError {
    /// The provider cannot encrypt right now (no key loaded).
    #[error("encryption provider unavailable")]
    Unavailable,

    /// Underlying crypto failure.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Provider-specific failure.
    #[error("{0}")]
    Other(String),
}
