use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entity::SettingsEnum;
use crate::error::{ModelError, ModelResult};
use crate::naming::{names_equal, sort_by_name};

/// The declared type of a settings field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Integer,
    Decimal,
    Boolean,
    Text,
    /// Stored as the member name, in a text column.
    Enumeration,
}

impl FieldType {
    /// The column type a field of this type is stored in.
    pub fn column_type(self) -> ColumnType {
        match self {
            FieldType::Integer => ColumnType::Integer,
            FieldType::Decimal => ColumnType::Decimal,
            FieldType::Boolean => ColumnType::Boolean,
            FieldType::Text | FieldType::Enumeration => ColumnType::Text,
        }
    }

    /// Whether values of this type can be encrypted at rest.
    pub fn supports_encryption(self) -> bool {
        matches!(self, FieldType::Text | FieldType::Enumeration)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::Decimal => "decimal",
            FieldType::Boolean => "boolean",
            FieldType::Text => "text",
            FieldType::Enumeration => "enumeration",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The scalar type of a stored column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Decimal,
    Boolean,
    Text,
}

impl ColumnType {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Decimal => "decimal",
            ColumnType::Boolean => "boolean",
            ColumnType::Text => "text",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column as a storage backend sees it: name, scalar type and optional
/// documentation text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub column_type: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            description: None,
        }
    }
}

/// Static metadata for one member of a settings entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name, also the column name.
    pub name: String,
    pub field_type: FieldType,
    /// Encrypt the value at rest when an encryption provider is configured.
    #[serde(default)]
    pub sensitive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Member names. Only meaningful when `field_type` is `Enumeration`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_members: Option<Vec<String>>,
}

impl FieldDescriptor {
    fn simple(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            sensitive: false,
            description: None,
            enum_members: None,
        }
    }

    /// Shorthand for an integer field.
    pub fn integer(name: &str) -> Self {
        Self::simple(name, FieldType::Integer)
    }

    /// Shorthand for a decimal field.
    pub fn decimal(name: &str) -> Self {
        Self::simple(name, FieldType::Decimal)
    }

    /// Shorthand for a boolean field.
    pub fn boolean(name: &str) -> Self {
        Self::simple(name, FieldType::Boolean)
    }

    /// Shorthand for a text field.
    pub fn text(name: &str) -> Self {
        Self::simple(name, FieldType::Text)
    }

    /// Shorthand for an enumeration field with the given member names.
    pub fn enumeration<S: Into<String>>(name: &str, members: impl IntoIterator<Item = S>) -> Self {
        Self {
            enum_members: Some(members.into_iter().map(Into::into).collect()),
            ..Self::simple(name, FieldType::Enumeration)
        }
    }

    /// Enumeration field whose members are those of `E`.
    pub fn for_enum<E: SettingsEnum>(name: &str) -> Self {
        Self::enumeration(name, E::MEMBERS.iter().copied())
    }

    /// Marks the field for encryption at rest.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Attaches documentation text.
    pub fn described(mut self, description: &str) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether `value` names a member of this enumeration field.
    pub fn has_member(&self, value: &str) -> bool {
        self.enum_members
            .as_ref()
            .is_some_and(|members| members.iter().any(|m| m == value))
    }

    /// The column this field is stored in.
    pub fn column(&self) -> ColumnDescriptor {
        ColumnDescriptor {
            name: self.name.clone(),
            column_type: self.field_type.column_type(),
            description: self.description.clone(),
        }
    }

    /// Checks the per-field invariants: non-empty name, sensitivity only on
    /// encryptable types, enumerations with members.
    pub fn validate(&self, entity: &str) -> ModelResult<()> {
        if self.name.is_empty() {
            return Err(ModelError::EmptyFieldName(entity.into()));
        }
        if self.sensitive && !self.field_type.supports_encryption() {
            return Err(ModelError::SensitiveFieldType {
                field: self.name.clone(),
                field_type: self.field_type.to_string(),
            });
        }
        if self.field_type == FieldType::Enumeration
            && self.enum_members.as_ref().is_none_or(|m| m.is_empty())
        {
            return Err(ModelError::EmptyEnumeration(self.name.clone()));
        }
        Ok(())
    }
}

/// The shape of one settings entity type: the table name plus its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    /// Type identifier, used verbatim as the table name.
    pub entity_type: String,
    pub fields: Vec<FieldDescriptor>,
}

impl EntityDescriptor {
    /// Builds a descriptor, rejecting shapes that cannot be reconciled.
    pub fn new(entity_type: &str, fields: Vec<FieldDescriptor>) -> ModelResult<Self> {
        let descriptor = Self {
            entity_type: entity_type.into(),
            fields,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Checks the entity-level invariants.
    ///
    /// Field names must be unique under the same case-insensitive ordering the
    /// reconciler merges with.
    pub fn validate(&self) -> ModelResult<()> {
        if self.entity_type.is_empty() {
            return Err(ModelError::EmptyEntityType);
        }
        if self.fields.is_empty() {
            return Err(ModelError::NoFields(self.entity_type.clone()));
        }
        for field in &self.fields {
            field.validate(&self.entity_type)?;
        }
        let sorted = self.sorted_fields();
        if let Some(pair) = sorted.windows(2).find(|w| names_equal(&w[0].name, &w[1].name)) {
            return Err(ModelError::DuplicateField {
                entity: self.entity_type.clone(),
                field: pair[1].name.clone(),
            });
        }
        Ok(())
    }

    /// Looks a field up by exact name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields in reconciliation order.
    pub fn sorted_fields(&self) -> Vec<&FieldDescriptor> {
        let mut fields: Vec<&FieldDescriptor> = self.fields.iter().collect();
        sort_by_name(&mut fields, |f| f.name.as_str());
        fields
    }

    /// Columns for every field, in reconciliation order.
    pub fn columns(&self) -> Vec<ColumnDescriptor> {
        self.sorted_fields().into_iter().map(FieldDescriptor::column).collect()
    }
}
