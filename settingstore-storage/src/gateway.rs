use settingstore_model::{ColumnDescriptor, ColumnValue, StoredRow};

use crate::error::{StorageError, StorageResult};

/// Row-level access to a tabular store holding one row per table.
///
/// A gateway knows nothing about entity types or encryption: it creates
/// tables, adds and drops columns, and reads or rewrites the single row.
/// Every call is synchronous and failures are returned as-is; callers do not
/// retry.
///
/// Backends share these rules:
/// - column names are matched case-insensitively when adding, dropping and
///   inserting, and a matched column keeps the name it was created with;
/// - values come back in the form the backend holds them, which need not be
///   the column's declared type (a backend without booleans reports `0`/`1`
///   integers); converting to a field's type happens above the gateway;
/// - a table that exists but holds no row is reported by [`get_row`] as a row
///   of `Null` values over its columns, so its column set stays visible;
/// - creating an existing table, adding an existing column and naming an
///   unknown column are errors.
///
/// [`get_row`]: StorageGateway::get_row
pub trait StorageGateway: Send + Sync {
    /// Where the data lives (a file path, `:memory:`, ...).
    fn data_source(&self) -> String;

    /// The table's row, or `None` if the table does not exist.
    fn get_row(&self, table: &str) -> StorageResult<Option<StoredRow>>;

    fn create_table(&self, table: &str, columns: &[ColumnDescriptor]) -> StorageResult<()>;

    fn add_column(&self, table: &str, column: &ColumnDescriptor) -> StorageResult<()>;

    fn drop_column(&self, table: &str, column: &str) -> StorageResult<()>;

    /// Inserts one row. Columns not named in `values` are left `Null`.
    fn insert_row(&self, table: &str, values: &[ColumnValue]) -> StorageResult<()>;

    fn delete_all_rows(&self, table: &str) -> StorageResult<()>;
}

/// Rejects names no backend can store: empty, or containing NUL.
pub(crate) fn check_identifier(name: &str) -> StorageResult<()> {
    if name.is_empty() || name.contains('\0') {
        return Err(StorageError::InvalidIdentifier(name.into()));
    }
    Ok(())
}
