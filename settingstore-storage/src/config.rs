//! Backend selection.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::StorageResult;
use crate::gateway::StorageGateway;
use crate::json_file::JsonFileStore;
use crate::memory::MemoryStore;
use crate::sqlite::SqliteStore;

const SETTINGS_FOLDER: &str = "Settings";
const SETTINGS_FILE: &str = "settings.json";

/// Which storage backend to open, deserializable from application config.
///
/// ```json
/// { "backend": "json_file", "path": "/etc/myapp/settings.json", "pretty": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Process-local, lost on exit.
    Memory,
    /// SQLite database file.
    Sqlite { path: PathBuf },
    /// Private in-memory SQLite database.
    SqliteInMemory,
    /// JSON document holding every table.
    JsonFile {
        path: PathBuf,
        #[serde(default = "default_pretty")]
        pretty: bool,
    },
}

fn default_pretty() -> bool {
    true
}

impl StoreConfig {
    /// JSON file store at the conventional per-product location.
    pub fn json_for_product(company: Option<&str>, product: &str) -> Option<Self> {
        default_settings_path(company, product).map(|path| StoreConfig::JsonFile {
            path,
            pretty: true,
        })
    }
}

/// Opens the gateway `config` describes.
pub fn open_gateway(config: &StoreConfig) -> StorageResult<Arc<dyn StorageGateway>> {
    Ok(match config {
        StoreConfig::Memory => Arc::new(MemoryStore::new()),
        StoreConfig::Sqlite { path } => Arc::new(SqliteStore::open(path)?),
        StoreConfig::SqliteInMemory => Arc::new(SqliteStore::open_in_memory()?),
        StoreConfig::JsonFile { path, pretty } => Arc::new(JsonFileStore::open(path, *pretty)?),
    })
}

/// `<data dir>/[<company>/]<product>/Settings/settings.json`, or `None` when
/// the platform has no data directory.
pub fn default_settings_path(company: Option<&str>, product: &str) -> Option<PathBuf> {
    dirs::data_dir().map(|base| settings_path_under(&base, company, product))
}

/// The settings file location below an explicit base directory.
pub fn settings_path_under(base: &Path, company: Option<&str>, product: &str) -> PathBuf {
    let mut path = base.to_path_buf();
    if let Some(company) = company {
        path.push(company);
    }
    path.push(product);
    path.push(SETTINGS_FOLDER);
    path.push(SETTINGS_FILE);
    path
}
