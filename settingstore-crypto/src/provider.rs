//! The encryption contract the settings layer consumes.
//!
//! Repositories hold an `Option<Arc<dyn EncryptionProvider>>`; they never see
//! key material.

use crate::cipher::{open_text, seal_text};
use crate::error::EncryptorResult;
use crate::key::{derive_key, generate_random_key, DerivedKey, KdfParams, Salt};

/// Encrypts and decrypts the text form of sensitive field values.
///
/// Implementations are stateless from the caller's point of view: any value
/// produced by `encrypt` must be accepted by `decrypt` on the same provider.
pub trait EncryptionProvider: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> EncryptorResult<String>;

    fn decrypt(&self, ciphertext: &str) -> EncryptorResult<String>;
}

/// ChaCha20-Poly1305 provider with a single key.
#[derive(Debug, Clone)]
pub struct CipherProvider {
    key: DerivedKey,
}

impl CipherProvider {
    pub fn new(key: DerivedKey) -> Self {
        Self { key }
    }

    /// Provider with a fresh random key. Values it seals are lost with it.
    pub fn random() -> Self {
        Self::new(generate_random_key())
    }

    /// Provider keyed from a password with Argon2id.
    pub fn from_password(
        password: &str,
        salt: &Salt,
        params: &KdfParams,
    ) -> EncryptorResult<Self> {
        Ok(Self::new(derive_key(password, salt, params)?))
    }
}

impl EncryptionProvider for CipherProvider {
    fn encrypt(&self, plaintext: &str) -> EncryptorResult<String> {
        Ok(seal_text(&self.key, plaintext)?)
    }

    fn decrypt(&self, ciphertext: &str) -> EncryptorResult<String> {
        Ok(open_text(&self.key, ciphertext)?)
    }
}
