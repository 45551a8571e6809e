//! JSON file gateway: every settings table in one human-editable document.
//!
//! ```json
//! {
//!   "GeneralSettings": {
//!     "columns": [
//!       { "name": "Count", "column_type": "integer", "description": "Retry count" },
//!       { "name": "Name", "column_type": "text" }
//!     ],
//!     "row": { "Count": 5, "Name": "X" }
//!   }
//! }
//! ```
//!
//! Column descriptions are written next to each column so the file documents
//! itself. The whole document is rewritten after every mutation through a
//! temporary file and a rename.

use serde::{Deserialize, Serialize};
use settingstore_model::{names_equal, ColumnDescriptor, ColumnValue, StoredRow, StoredValue};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::gateway::StorageGateway;
use crate::table::Table;

#[derive(Debug, Serialize, Deserialize)]
struct FileTable {
    columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    row: Option<BTreeMap<String, StoredValue>>,
}

impl From<&Table> for FileTable {
    fn from(table: &Table) -> Self {
        let row = table.row.as_ref().map(|values| {
            table
                .columns
                .iter()
                .zip(values)
                .map(|(c, v)| (c.name.clone(), v.clone()))
                .collect()
        });
        Self {
            columns: table.columns.clone(),
            row,
        }
    }
}

impl FileTable {
    fn into_table(self) -> Table {
        let row = self.row.map(|values| {
            self.columns
                .iter()
                .map(|column| {
                    values
                        .get(&column.name)
                        .or_else(|| {
                            values
                                .iter()
                                .find(|(name, _)| names_equal(name, &column.name))
                                .map(|(_, v)| v)
                        })
                        .cloned()
                        .unwrap_or(StoredValue::Null)
                })
                .collect()
        });
        Table {
            columns: self.columns,
            row,
        }
    }
}

/// [`StorageGateway`] persisting every table to one JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    pretty: bool,
    tables: Mutex<BTreeMap<String, Table>>,
}

impl JsonFileStore {
    /// Opens the document at `path`, creating it (and its directory) when
    /// missing. `pretty` selects indented output.
    pub fn open(path: &Path, pretty: bool) -> StorageResult<Self> {
        let tables = if path.exists() {
            load(path)?
        } else {
            BTreeMap::new()
        };
        let store = Self {
            path: path.to_path_buf(),
            pretty,
            tables: Mutex::new(tables),
        };
        if !path.exists() {
            let tables = store.tables.lock()?;
            store.persist(&tables)?;
            debug!("created JSON settings store at {}", path.display());
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, tables: &BTreeMap<String, Table>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let document: BTreeMap<&str, FileTable> = tables
            .iter()
            .map(|(name, table)| (name.as_str(), FileTable::from(table)))
            .collect();
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&document)?
        } else {
            serde_json::to_vec(&document)?
        };

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Applies `f` to a copy of the tables and commits it only once the file
    /// has been written.
    fn mutate(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, Table>) -> StorageResult<()>,
    ) -> StorageResult<()> {
        let mut tables = self.tables.lock()?;
        let mut next = tables.clone();
        f(&mut next)?;
        self.persist(&next)?;
        *tables = next;
        Ok(())
    }
}

fn load(path: &Path) -> StorageResult<BTreeMap<String, Table>> {
    let bytes = fs::read(path)?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(BTreeMap::new());
    }
    let document: BTreeMap<String, FileTable> = serde_json::from_slice(&bytes)?;
    Ok(document
        .into_iter()
        .map(|(name, table)| (name, table.into_table()))
        .collect())
}

fn table_mut<'a>(
    tables: &'a mut BTreeMap<String, Table>,
    table: &str,
) -> StorageResult<&'a mut Table> {
    tables
        .get_mut(table)
        .ok_or_else(|| StorageError::TableNotFound(table.into()))
}

impl StorageGateway for JsonFileStore {
    fn data_source(&self) -> String {
        self.path.display().to_string()
    }

    fn get_row(&self, table: &str) -> StorageResult<Option<StoredRow>> {
        Ok(self.tables.lock()?.get(table).map(Table::stored_row))
    }

    fn create_table(&self, table: &str, columns: &[ColumnDescriptor]) -> StorageResult<()> {
        self.mutate(|tables| {
            if tables.contains_key(table) {
                return Err(StorageError::TableExists(table.into()));
            }
            tables.insert(table.into(), Table::create(table, columns)?);
            Ok(())
        })
    }

    fn add_column(&self, table: &str, column: &ColumnDescriptor) -> StorageResult<()> {
        self.mutate(|tables| table_mut(tables, table)?.add_column(table, column))
    }

    fn drop_column(&self, table: &str, column: &str) -> StorageResult<()> {
        self.mutate(|tables| table_mut(tables, table)?.drop_column(table, column))
    }

    fn insert_row(&self, table: &str, values: &[ColumnValue]) -> StorageResult<()> {
        self.mutate(|tables| table_mut(tables, table)?.insert_row(table, values))
    }

    fn delete_all_rows(&self, table: &str) -> StorageResult<()> {
        self.mutate(|tables| {
            table_mut(tables, table)?.delete_all_rows();
            Ok(())
        })
    }
}
