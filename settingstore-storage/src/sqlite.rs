//! SQLite gateway: one real table per settings entity.

use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection};
use settingstore_model::{names_equal, ColumnDescriptor, ColumnType, ColumnValue, StoredRow, StoredValue};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::gateway::{check_identifier, StorageGateway};

/// [`StorageGateway`] backed by a SQLite database.
///
/// Column types map to `INTEGER`, `REAL`, `BOOLEAN` and `TEXT`. Identifiers
/// are always double-quoted, so any non-empty name without NUL is accepted.
///
/// Values are read back in the storage class SQLite holds, not converted to
/// the declared column type: booleans come back as integers `0`/`1`. A column
/// keeps its declared type when its field's type changes, so SQLite's type
/// affinity still applies to what is written into it. Numeric-looking text in
/// an `INTEGER`, `REAL` or `BOOLEAN` column is stored as a number (`"007"`
/// reads back as `7`), and numbers in a `TEXT` column are stored as text.
///
/// SQLite folds only ASCII letters in identifiers, while column lookups here
/// ignore case for any letter. Values and drops are therefore resolved to the
/// stored column's exact name before any SQL is built.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    source: String,
}

impl SqliteStore {
    /// Opens (or creates) a database file, creating parent directories.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        debug!("opened SQLite settings store at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            source: path.display().to_string(),
        })
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            source: ":memory:".to_string(),
        })
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("source", &self.source)
            .finish()
    }
}

impl StorageGateway for SqliteStore {
    fn data_source(&self) -> String {
        self.source.clone()
    }

    fn get_row(&self, table: &str) -> StorageResult<Option<StoredRow>> {
        let conn = self.conn.lock()?;
        if !table_exists(&conn, table)? {
            return Ok(None);
        }
        let columns = table_columns(&conn, table)?;

        let mut stmt = conn.prepare(&format!("SELECT * FROM {} LIMIT 1", quote(table)?))?;
        let mut rows = stmt.query([])?;
        let mut stored = StoredRow::new();
        match rows.next()? {
            Some(row) => {
                for (index, column) in columns.into_iter().enumerate() {
                    let value = read_value(row.get_ref(index)?, &column)?;
                    stored.push(column, value);
                }
            }
            None => {
                for column in columns {
                    stored.push(column, StoredValue::Null);
                }
            }
        }
        Ok(Some(stored))
    }

    fn create_table(&self, table: &str, columns: &[ColumnDescriptor]) -> StorageResult<()> {
        if columns.is_empty() {
            return Err(StorageError::InvalidData(format!(
                "table `{table}` needs at least one column"
            )));
        }
        let conn = self.conn.lock()?;
        if table_exists(&conn, table)? {
            return Err(StorageError::TableExists(table.into()));
        }
        let definitions = columns
            .iter()
            .map(|c| Ok(format!("{} {}", quote(&c.name)?, sql_type(c.column_type))))
            .collect::<StorageResult<Vec<_>>>()?;
        conn.execute_batch(&format!(
            "CREATE TABLE {} ({})",
            quote(table)?,
            definitions.join(", ")
        ))?;
        Ok(())
    }

    fn add_column(&self, table: &str, column: &ColumnDescriptor) -> StorageResult<()> {
        let conn = self.conn.lock()?;
        let existing = existing_columns(&conn, table)?;
        if existing.iter().any(|c| names_equal(&c.name, &column.name)) {
            return Err(StorageError::DuplicateColumn {
                table: table.into(),
                column: column.name.clone(),
            });
        }
        conn.execute_batch(&format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            quote(table)?,
            quote(&column.name)?,
            sql_type(column.column_type)
        ))?;
        Ok(())
    }

    fn drop_column(&self, table: &str, column: &str) -> StorageResult<()> {
        let conn = self.conn.lock()?;
        let existing = existing_columns(&conn, table)?;
        let stored = resolve_column(&existing, table, column)?;
        conn.execute_batch(&format!(
            "ALTER TABLE {} DROP COLUMN {}",
            quote(table)?,
            quote(stored)?
        ))?;
        Ok(())
    }

    fn insert_row(&self, table: &str, values: &[ColumnValue]) -> StorageResult<()> {
        let conn = self.conn.lock()?;
        let existing = existing_columns(&conn, table)?;
        let names = values
            .iter()
            .map(|v| quote(resolve_column(&existing, table, &v.column)?))
            .collect::<StorageResult<Vec<_>>>()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote(table)?),
            params![],
            |row| row.get(0),
        )?;
        if count > 0 {
            return Err(StorageError::RowExists(table.into()));
        }

        if values.is_empty() {
            conn.execute_batch(&format!("INSERT INTO {} DEFAULT VALUES", quote(table)?))?;
            return Ok(());
        }

        let placeholders = (1..=values.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote(table)?,
            names.join(", "),
            placeholders.join(", ")
        );
        conn.execute(&sql, params_from_iter(values.iter().map(|v| to_sql_value(&v.value))))?;
        Ok(())
    }

    fn delete_all_rows(&self, table: &str) -> StorageResult<()> {
        let conn = self.conn.lock()?;
        if !table_exists(&conn, table)? {
            return Err(StorageError::TableNotFound(table.into()));
        }
        conn.execute(&format!("DELETE FROM {}", quote(table)?), params![])?;
        Ok(())
    }
}

/// The stored name of the column `name` refers to, ignoring case.
fn resolve_column<'a>(
    existing: &'a [ColumnDescriptor],
    table: &str,
    name: &str,
) -> StorageResult<&'a str> {
    existing
        .iter()
        .find(|c| names_equal(&c.name, name))
        .map(|c| c.name.as_str())
        .ok_or_else(|| StorageError::UnknownColumn {
            table: table.into(),
            column: name.into(),
        })
}

fn quote(name: &str) -> StorageResult<String> {
    check_identifier(name)?;
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

fn sql_type(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::Integer => "INTEGER",
        ColumnType::Decimal => "REAL",
        ColumnType::Boolean => "BOOLEAN",
        ColumnType::Text => "TEXT",
    }
}

/// Maps a declared SQL type back onto a column type, following SQLite's
/// affinity rules with `BOOL` checked first.
fn column_type_from_decl(declared: &str) -> ColumnType {
    let declared = declared.to_ascii_uppercase();
    if declared.contains("BOOL") {
        ColumnType::Boolean
    } else if declared.contains("INT") {
        ColumnType::Integer
    } else if ["REAL", "FLOA", "DOUB", "DEC", "NUM"]
        .iter()
        .any(|t| declared.contains(t))
    {
        ColumnType::Decimal
    } else {
        ColumnType::Text
    }
}

fn table_exists(conn: &Connection, table: &str) -> StorageResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
        params![table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn table_columns(conn: &Connection, table: &str) -> StorageResult<Vec<ColumnDescriptor>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote(table)?))?;
    let rows = stmt.query_map([], |row| {
        let name: String = row.get(1)?;
        let declared: String = row.get(2)?;
        Ok((name, declared))
    })?;

    let mut columns = Vec::new();
    for row in rows {
        let (name, declared) = row?;
        columns.push(ColumnDescriptor::new(name, column_type_from_decl(&declared)));
    }
    Ok(columns)
}

fn existing_columns(conn: &Connection, table: &str) -> StorageResult<Vec<ColumnDescriptor>> {
    if !table_exists(conn, table)? {
        return Err(StorageError::TableNotFound(table.into()));
    }
    table_columns(conn, table)
}

fn read_value(value: ValueRef<'_>, column: &ColumnDescriptor) -> StorageResult<StoredValue> {
    Ok(match value {
        ValueRef::Null => StoredValue::Null,
        ValueRef::Integer(i) => StoredValue::Integer(i),
        ValueRef::Real(f) => StoredValue::Decimal(f),
        ValueRef::Text(bytes) => StoredValue::Text(
            String::from_utf8(bytes.to_vec())
                .map_err(|e| StorageError::InvalidData(format!("column `{}`: {e}", column.name)))?,
        ),
        ValueRef::Blob(_) => {
            return Err(StorageError::InvalidData(format!(
                "column `{}` holds a BLOB",
                column.name
            )));
        }
    })
}

fn to_sql_value(value: &StoredValue) -> Value {
    match value {
        StoredValue::Null => Value::Null,
        StoredValue::Boolean(b) => Value::Integer(i64::from(*b)),
        StoredValue::Integer(i) => Value::Integer(*i),
        StoredValue::Decimal(d) => Value::Real(*d),
        StoredValue::Text(s) => Value::Text(s.clone()),
    }
}
