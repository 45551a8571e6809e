//! Error types for the settings layer.

use settingstore_crypto::EncryptorError;
use settingstore_model::ModelError;
use settingstore_storage::StorageError;
use thiserror::Error;

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Everything `get`, `update` and the cache calls can fail with.
///
/// None of these are retried. A failure in the middle of an update can leave
/// the table partly migrated; the next successful update converges it.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A required collaborator is missing or an entity is declared in a way
    /// that cannot be persisted.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A stored value cannot be coerced to the field's declared type.
    #[error("cannot convert {from} to {to}: {detail}")]
    TypeConversion {
        from: String,
        to: String,
        detail: String,
    },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("encryption error: {0}")]
    Encryption(#[from] EncryptorError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// An observer failed while being notified of a change. The change itself
    /// has already been applied.
    #[error("observer failed: {0}")]
    Observer(anyhow::Error),
}

impl SettingsError {
    pub(crate) fn conversion(
        from: impl Into<String>,
        to: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        SettingsError::TypeConversion {
            from: from.into(),
            to: to.into(),
            detail: detail.into(),
        }
    }
}
