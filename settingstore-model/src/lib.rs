//! Settings entity model for settingstore.
//!
//! Defines the types every other settingstore crate depends on:
//! - [`EntityDescriptor`] / [`FieldDescriptor`]: the static shape of a settings entity
//! - [`StoredValue`] / [`StoredRow`]: what a storage backend holds for one table
//! - [`FieldValue`]: a typed field value as the entity sees it
//! - [`SettingsEntity`] / [`SettingsEnum`]: the traits an entity type implements
//!   in place of runtime reflection
//! - [`SettingsChange`]: the old/new pair delivered to observers
//!
//! Each entity type maps to exactly one table named after
//! [`EntityDescriptor::entity_type`], and each field to one column.

mod entity;
mod error;
mod naming;
mod schema;
mod value;

pub use entity::{SettingsChange, SettingsEntity, SettingsEnum};
pub use error::{ModelError, ModelResult};
pub use naming::{compare_names, names_equal, sort_by_name};
pub use schema::{ColumnDescriptor, ColumnType, EntityDescriptor, FieldDescriptor, FieldType};
pub use value::{ColumnValue, FieldValue, StoredRow, StoredValue};
