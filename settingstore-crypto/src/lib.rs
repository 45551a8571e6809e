//! Encryption at rest for sensitive settings fields.
//!
//! The persistence layer only sees the [`EncryptionProvider`] trait: text in,
//! text out. [`CipherProvider`] is the bundled implementation, sealing each
//! value with ChaCha20-Poly1305 under a key that is either random or derived
//! from a password with Argon2id.

mod cipher;
mod error;
mod key;
mod provider;

pub use cipher::{open_text, seal_text, SealedText, NONCE_SIZE, TAG_SIZE};
pub use error::{CryptoError, CryptoResult, EncryptorError, EncryptorResult};
pub use key::{derive_key, generate_random_key, DerivedKey, KdfParams, Salt, KEY_SIZE, SALT_SIZE};
pub use provider::{CipherProvider, EncryptionProvider};
