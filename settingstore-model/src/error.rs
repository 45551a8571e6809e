//! Error types for the entity model.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while declaring or populating a settings entity.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The entity type name is empty.
    #[error("entity type name must not be empty")]
    EmptyEntityType,

    /// The entity declares no fields; a table needs at least one column.
    #[error("entity `{0}` declares no fields")]
    NoFields(String),

    /// Two fields collide under the case-insensitive name ordering.
    #[error("entity `{entity}` declares field `{field}` more than once")]
    DuplicateField { entity: String, field: String },

    /// A field name is empty.
    #[error("entity `{0}` declares a field with an empty name")]
    EmptyFieldName(String),

    /// A sensitive field whose type cannot be encrypted as text.
    #[error("field `{field}` is marked sensitive but has type {field_type}; only text and enumeration fields can be encrypted")]
    SensitiveFieldType { field: String, field_type: String },

    /// An enumeration field without any members.
    #[error("enumeration field `{0}` has no members")]
    EmptyEnumeration(String),

    /// The entity has no field with this name.
    #[error("entity `{entity}` has no field `{field}`")]
    UnknownField { entity: String, field: String },

    /// A value of the wrong kind was assigned to a field.
    #[error("field `{field}` expects {expected}, got {actual}")]
    FieldTypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// An enumeration member name the Rust enum does not know.
    #[error("`{value}` is not a member of enumeration field `{field}`")]
    UnknownEnumMember { field: String, value: String },
}
