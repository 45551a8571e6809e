//! Reference gateway holding every table in process memory.

use settingstore_model::{ColumnDescriptor, ColumnValue, StoredRow};
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::{StorageError, StorageResult};
use crate::gateway::StorageGateway;
use crate::table::Table;

/// In-memory [`StorageGateway`]. Data lives as long as the store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<BTreeMap<String, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of every table, sorted.
    pub fn table_names(&self) -> StorageResult<Vec<String>> {
        Ok(self.tables.lock()?.keys().cloned().collect())
    }

    fn with_table<R>(
        &self,
        table: &str,
        f: impl FnOnce(&mut Table) -> StorageResult<R>,
    ) -> StorageResult<R> {
        let mut tables = self.tables.lock()?;
        let data = tables
            .get_mut(table)
            .ok_or_else(|| StorageError::TableNotFound(table.into()))?;
        f(data)
    }
}

impl StorageGateway for MemoryStore {
    fn data_source(&self) -> String {
        "<memory>".to_string()
    }

    fn get_row(&self, table: &str) -> StorageResult<Option<StoredRow>> {
        Ok(self.tables.lock()?.get(table).map(Table::stored_row))
    }

    fn create_table(&self, table: &str, columns: &[ColumnDescriptor]) -> StorageResult<()> {
        let mut tables = self.tables.lock()?;
        if tables.contains_key(table) {
            return Err(StorageError::TableExists(table.into()));
        }
        tables.insert(table.into(), Table::create(table, columns)?);
        Ok(())
    }

    fn add_column(&self, table: &str, column: &ColumnDescriptor) -> StorageResult<()> {
        self.with_table(table, |t| t.add_column(table, column))
    }

    fn drop_column(&self, table: &str, column: &str) -> StorageResult<()> {
        self.with_table(table, |t| t.drop_column(table, column))
    }

    fn insert_row(&self, table: &str, values: &[ColumnValue]) -> StorageResult<()> {
        self.with_table(table, |t| t.insert_row(table, values))
    }

    fn delete_all_rows(&self, table: &str) -> StorageResult<()> {
        self.with_table(table, |t| {
            t.delete_all_rows();
            Ok(())
        })
    }
}
