//! In-memory table shared by the memory and JSON file backends.

use settingstore_model::{names_equal, ColumnDescriptor, ColumnValue, StoredRow, StoredValue};

use crate::error::{StorageError, StorageResult};
use crate::gateway::check_identifier;

/// Column metadata plus the table's optional single row, aligned by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Table {
    pub(crate) columns: Vec<ColumnDescriptor>,
    pub(crate) row: Option<Vec<StoredValue>>,
}

impl Table {
    pub(crate) fn create(name: &str, columns: &[ColumnDescriptor]) -> StorageResult<Self> {
        check_identifier(name)?;
        let mut table = Self::default();
        for column in columns {
            table.add_column(name, column)?;
        }
        Ok(table)
    }

    pub(crate) fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| names_equal(&c.name, column))
    }

    pub(crate) fn add_column(&mut self, table: &str, column: &ColumnDescriptor) -> StorageResult<()> {
        check_identifier(&column.name)?;
        if self.position(&column.name).is_some() {
            return Err(StorageError::DuplicateColumn {
                table: table.into(),
                column: column.name.clone(),
            });
        }
        self.columns.push(column.clone());
        if let Some(row) = self.row.as_mut() {
            row.push(StoredValue::Null);
        }
        Ok(())
    }

    pub(crate) fn drop_column(&mut self, table: &str, column: &str) -> StorageResult<()> {
        let index = self.position(column).ok_or_else(|| StorageError::UnknownColumn {
            table: table.into(),
            column: column.into(),
        })?;
        self.columns.remove(index);
        if let Some(row) = self.row.as_mut() {
            row.remove(index);
        }
        Ok(())
    }

    pub(crate) fn insert_row(&mut self, table: &str, values: &[ColumnValue]) -> StorageResult<()> {
        if self.row.is_some() {
            return Err(StorageError::RowExists(table.into()));
        }
        let mut row = vec![StoredValue::Null; self.columns.len()];
        for value in values {
            let index = self.position(&value.column).ok_or_else(|| StorageError::UnknownColumn {
                table: table.into(),
                column: value.column.clone(),
            })?;
            row[index] = value.value.clone();
        }
        self.row = Some(row);
        Ok(())
    }

    pub(crate) fn delete_all_rows(&mut self) {
        self.row = None;
    }

    /// The row as the gateway contract reports it: `Null` everywhere when
    /// the table is empty.
    pub(crate) fn stored_row(&self) -> StoredRow {
        match &self.row {
            Some(values) => self
                .columns
                .iter()
                .cloned()
                .zip(values.iter().cloned())
                .collect(),
            None => self
                .columns
                .iter()
                .cloned()
                .map(|c| (c, StoredValue::Null))
                .collect(),
        }
    }
}
