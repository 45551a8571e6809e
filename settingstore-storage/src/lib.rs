//! Storage gateways for settingstore.
//!
//! A gateway persists settings tables that hold at most one row each. It is
//! the only part of settingstore that talks to a backend; schema
//! reconciliation, value conversion and encryption all happen above it.
//!
//! # Backends
//!
//! - [`MemoryStore`]: reference implementation, process-local
//! - [`SqliteStore`]: one SQLite table per settings entity
//! - [`JsonFileStore`]: every table in one JSON document
//!
//! [`StoreConfig`] and [`open_gateway`] pick a backend from configuration.

mod config;
mod error;
mod gateway;
mod json_file;
mod memory;
mod sqlite;
mod table;

pub use config::{default_settings_path, open_gateway, settings_path_under, StoreConfig};
pub use error::{StorageError, StorageResult};
pub use gateway::StorageGateway;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
