//! Schema reconciliation: aligning a stored table with an entity's current
//! field set.
//!
//! Fields and columns are both sorted with [`compare_names`] and walked in
//! lockstep:
//!
//! | comparison        | action                                  |
//! |-------------------|-----------------------------------------|
//! | field == column   | keep the column, persist the value      |
//! | field  < column   | add a column for the new field          |
//! | field  > column   | drop the obsolete column                |
//!
//! Whatever remains of either list after the walk is added or dropped. The
//! table's single row is then deleted and rewritten, so its columns always
//! match the reconciled schema.

use settingstore_model::{
    compare_names, sort_by_name, ColumnDescriptor, ColumnValue, EntityDescriptor,
    FieldDescriptor, ModelError, SettingsEntity, StoredRow,
};
use settingstore_storage::StorageGateway;
use std::cmp::Ordering;
use tracing::{debug, info};

use crate::codec::ValueCodec;
use crate::error::SettingsResult;

/// One schema change against a settings table.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaOperation {
    CreateTable(Vec<ColumnDescriptor>),
    AddColumn(ColumnDescriptor),
    DropColumn(String),
}

/// Everything one update does to storage, computed up front.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcilePlan {
    pub table: String,
    /// Whether the table already existed, i.e. its row must be deleted
    /// before the new one is inserted.
    pub existing: bool,
    /// Schema operations in merge order.
    pub operations: Vec<SchemaOperation>,
    /// The new row, one value per field in field order.
    pub values: Vec<ColumnValue>,
}

impl ReconcilePlan {
    /// Whether any column is added or dropped.
    pub fn is_schema_change(&self) -> bool {
        self.operations.iter().any(|op| {
            matches!(op, SchemaOperation::AddColumn(_) | SchemaOperation::DropColumn(_))
        })
    }

    pub fn added_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.operations.iter().filter_map(|op| match op {
            SchemaOperation::AddColumn(column) => Some(column),
            _ => None,
        })
    }

    pub fn dropped_columns(&self) -> impl Iterator<Item = &str> {
        self.operations.iter().filter_map(|op| match op {
            SchemaOperation::DropColumn(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Runs the plan: schema operations, then the row rewrite.
    ///
    /// Additions run before drops so the table never passes through a state
    /// without columns. A failure stops immediately; operations already run
    /// are not undone.
    pub fn apply(&self, gateway: &dyn StorageGateway) -> SettingsResult<()> {
        for operation in &self.operations {
            match operation {
                SchemaOperation::CreateTable(columns) => {
                    gateway.create_table(&self.table, columns)?;
                    info!(table = %self.table, columns = columns.len(), "created settings table");
                }
                SchemaOperation::AddColumn(column) => {
                    gateway.add_column(&self.table, column)?;
                    info!(table = %self.table, column = %column.name, "added settings column");
                }
                SchemaOperation::DropColumn(_) => {}
            }
        }
        for name in self.dropped_columns() {
            gateway.drop_column(&self.table, name)?;
            info!(table = %self.table, column = %name, "dropped settings column");
        }

        if self.existing {
            gateway.delete_all_rows(&self.table)?;
        }
        gateway.insert_row(&self.table, &self.values)?;
        debug!(table = %self.table, values = self.values.len(), "rewrote settings row");
        Ok(())
    }
}

/// Computes [`ReconcilePlan`]s, encoding values with one codec.
#[derive(Debug, Clone, Copy)]
pub struct SchemaReconciler<'a> {
    codec: &'a ValueCodec,
}

impl<'a> SchemaReconciler<'a> {
    pub fn new(codec: &'a ValueCodec) -> Self {
        Self { codec }
    }

    /// Plans persisting `entity` over the stored `row` (`None` when the table
    /// does not exist yet).
    pub fn plan<T: SettingsEntity>(
        &self,
        descriptor: &EntityDescriptor,
        entity: &T,
        row: Option<&StoredRow>,
    ) -> SettingsResult<ReconcilePlan> {
        let fields = descriptor.sorted_fields();
        let mut operations = Vec::new();
        let mut values = Vec::with_capacity(fields.len());

        let Some(row) = row else {
            operations.push(SchemaOperation::CreateTable(descriptor.columns()));
            for field in &fields {
                values.push(self.encode_field(descriptor, entity, field)?);
            }
            return Ok(ReconcilePlan {
                table: descriptor.entity_type.clone(),
                existing: false,
                operations,
                values,
            });
        };

        let mut columns: Vec<&ColumnDescriptor> = row.columns().collect();
        sort_by_name(&mut columns, |c| c.name.as_str());

        let (mut f, mut c) = (0, 0);
        while f < fields.len() && c < columns.len() {
            let field = fields[f];
            match compare_names(&field.name, &columns[c].name) {
                Ordering::Equal => {
                    values.push(self.encode_field(descriptor, entity, field)?);
                    f += 1;
                    c += 1;
                }
                Ordering::Less => {
                    operations.push(SchemaOperation::AddColumn(field.column()));
                    values.push(self.encode_field(descriptor, entity, field)?);
                    f += 1;
                }
                Ordering::Greater => {
                    operations.push(SchemaOperation::DropColumn(columns[c].name.clone()));
                    c += 1;
                }
            }
        }
        for field in &fields[f..] {
            operations.push(SchemaOperation::AddColumn(field.column()));
            values.push(self.encode_field(descriptor, entity, field)?);
        }
        for column in &columns[c..] {
            operations.push(SchemaOperation::DropColumn(column.name.clone()));
        }

        Ok(ReconcilePlan {
            table: descriptor.entity_type.clone(),
            existing: true,
            operations,
            values,
        })
    }

    fn encode_field<T: SettingsEntity>(
        &self,
        descriptor: &EntityDescriptor,
        entity: &T,
        field: &FieldDescriptor,
    ) -> SettingsResult<ColumnValue> {
        let value = entity
            .field_value(&field.name)
            .ok_or_else(|| ModelError::UnknownField {
                entity: descriptor.entity_type.clone(),
                field: field.name.clone(),
            })?;
        let stored = self.codec.encode(&value, field)?;
        Ok(ColumnValue::new(field.name.clone(), stored))
    }
}
