use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entity::SettingsEnum;
use crate::error::{ModelError, ModelResult};
use crate::schema::{ColumnDescriptor, FieldType};

/// A scalar as a storage backend holds it.
///
/// Richer field types are narrowed to this set before they reach storage:
/// enumerations become their member name, encrypted fields become text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    /// No value in the column. Skipped on read.
    Null,
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl StoredValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            StoredValue::Null => "null",
            StoredValue::Boolean(_) => "boolean",
            StoredValue::Integer(_) => "integer",
            StoredValue::Decimal(_) => "decimal",
            StoredValue::Text(_) => "text",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, StoredValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StoredValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for StoredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredValue::Null => f.write_str("NULL"),
            StoredValue::Boolean(b) => write!(f, "{b}"),
            StoredValue::Integer(i) => write!(f, "{i}"),
            StoredValue::Decimal(d) => write!(f, "{d}"),
            StoredValue::Text(s) => f.write_str(s),
        }
    }
}

/// A typed field value as a settings entity exposes it.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    Text(String),
    /// An enumeration value, carried as its member name.
    Enumeration(String),
}

impl FieldValue {
    /// The declared field type this value belongs to.
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Integer(_) => FieldType::Integer,
            FieldValue::Decimal(_) => FieldType::Decimal,
            FieldValue::Boolean(_) => FieldType::Boolean,
            FieldValue::Text(_) => FieldType::Text,
            FieldValue::Enumeration(_) => FieldType::Enumeration,
        }
    }

    pub fn from_enum<E: SettingsEnum>(value: &E) -> Self {
        FieldValue::Enumeration(value.name().into())
    }

    /// Converts an enumeration value back into `E`.
    pub fn into_enum<E: SettingsEnum>(self, field: &str) -> ModelResult<E> {
        match self {
            FieldValue::Enumeration(name) => {
                E::from_name(&name).ok_or_else(|| ModelError::UnknownEnumMember {
                    field: field.into(),
                    value: name,
                })
            }
            other => Err(mismatch(field, FieldType::Enumeration, &other)),
        }
    }

    pub fn into_integer(self, field: &str) -> ModelResult<i64> {
        match self {
            FieldValue::Integer(i) => Ok(i),
            other => Err(mismatch(field, FieldType::Integer, &other)),
        }
    }

    pub fn into_decimal(self, field: &str) -> ModelResult<f64> {
        match self {
            FieldValue::Decimal(d) => Ok(d),
            other => Err(mismatch(field, FieldType::Decimal, &other)),
        }
    }

    pub fn into_bool(self, field: &str) -> ModelResult<bool> {
        match self {
            FieldValue::Boolean(b) => Ok(b),
            other => Err(mismatch(field, FieldType::Boolean, &other)),
        }
    }

    pub fn into_text(self, field: &str) -> ModelResult<String> {
        match self {
            FieldValue::Text(s) => Ok(s),
            other => Err(mismatch(field, FieldType::Text, &other)),
        }
    }
}

fn mismatch(field: &str, expected: FieldType, actual: &FieldValue) -> ModelError {
    ModelError::FieldTypeMismatch {
        field: field.into(),
        expected: expected.to_string(),
        actual: actual.field_type().to_string(),
    }
}

/// One value of the row about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnValue {
    pub column: String,
    pub value: StoredValue,
}

impl ColumnValue {
    pub fn new(column: impl Into<String>, value: StoredValue) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }
}

/// The single row of a settings table, with the table's column metadata.
///
/// Entries keep the order the backend reported them in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredRow {
    entries: Vec<(ColumnDescriptor, StoredValue)>,
}

impl StoredRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: ColumnDescriptor, value: StoredValue) {
        self.entries.push((column, value));
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, column: ColumnDescriptor, value: StoredValue) -> Self {
        self.push(column, value);
        self
    }

    /// Column metadata in row order.
    pub fn columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.entries.iter().map(|(c, _)| c)
    }

    /// Value of the column with exactly this name.
    pub fn get(&self, name: &str) -> Option<&StoredValue> {
        self.entries
            .iter()
            .find(|(c, _)| c.name == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ColumnDescriptor, &StoredValue)> {
        self.entries.iter().map(|(c, v)| (c, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(ColumnDescriptor, StoredValue)> for StoredRow {
    fn from_iter<I: IntoIterator<Item = (ColumnDescriptor, StoredValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
