//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by a storage gateway.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The table does not exist.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// `create_table` on a table that already exists.
    #[error("table already exists: {0}")]
    TableExists(String),

    /// `add_column` for a column the table already has.
    #[error("column `{column}` already exists in table `{table}`")]
    DuplicateColumn { table: String, column: String },

    /// A column the table does not have.
    #[error("column `{column}` not found in table `{table}`")]
    UnknownColumn { table: String, column: String },

    /// `insert_row` on a table that already holds its row.
    #[error("table `{0}` already holds a row")]
    RowExists(String),

    /// A table or column name the backend cannot represent.
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Stored data the backend cannot map onto a settings column.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A lock guarding backend state was poisoned by a panicking thread.
    #[error("storage lock poisoned")]
    Poisoned,
}

impl<T> From<std::sync::PoisonError<T>> for StorageError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StorageError::Poisoned
    }
}
