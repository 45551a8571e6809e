//! Typed settings entities persisted one row per table.
//!
//! Each [`SettingsEntity`] type owns a table named after it holding a single
//! row. On every update the table's columns are reconciled with the entity's
//! current fields, so entity shapes can evolve between releases: new fields
//! appear with their defaults, removed fields are dropped, retained fields
//! keep their values.
//!
//! # Layers
//!
//! - [`ValueCodec`]: stored scalar <-> field value, encryption of sensitive fields
//! - [`SchemaReconciler`]: plans column changes and the row to write
//! - [`SettingsRepository`]: get/update over a [`StorageGateway`]
//! - [`SubscriberRegistry`]: per-type change observers
//! - [`SettingsManager`]: the facade, built with [`SettingsManagerBuilder`]
//! - [`CachedSettingsManager`]: optional in-memory override
//!
//! # Concurrency
//!
//! Everything is synchronous. The registry and the cache are safe to share
//! between threads. Updates are not serialised per entity type; callers that
//! update the same type from several threads must lock around it.
//!
//! [`StorageGateway`]: settingstore_storage::StorageGateway

mod access;
mod cache;
mod codec;
mod error;
mod manager;
mod reconciler;
mod registry;
mod repository;

pub use access::{CachedSettingsAccess, SettingsAccess};
pub use cache::CachedSettingsManager;
pub use codec::{SensitiveFieldPolicy, ValueCodec};
pub use error::{SettingsError, SettingsResult};
pub use manager::{SettingsConfig, SettingsManager, SettingsManagerBuilder};
pub use reconciler::{ReconcilePlan, SchemaOperation, SchemaReconciler};
pub use registry::{Observer, ObserverId, SubscriberRegistry};
pub use repository::SettingsRepository;

pub use settingstore_model::{
    EntityDescriptor, FieldDescriptor, FieldType, FieldValue, ModelError, ModelResult,
    SettingsChange, SettingsEntity, SettingsEnum,
};
pub use settingstore_storage::{StoreConfig, StorageError, StorageGateway};
