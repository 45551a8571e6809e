//! Get and update for settings entities over a storage gateway.

use settingstore_model::{EntityDescriptor, SettingsEntity};
use settingstore_storage::StorageGateway;
use std::sync::Arc;
use tracing::debug;

use crate::codec::ValueCodec;
use crate::error::{SettingsError, SettingsResult};
use crate::reconciler::{ReconcilePlan, SchemaReconciler};

/// Reads and writes settings entities, one table per entity type.
///
/// The repository is not internally synchronised. An update is a
/// read-modify-write of the table (read row, add and drop columns, delete,
/// insert); callers must serialise concurrent updates of the same entity type.
#[derive(Clone)]
pub struct SettingsRepository {
    gateway: Arc<dyn StorageGateway>,
    codec: ValueCodec,
}

impl std::fmt::Debug for SettingsRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsRepository")
            .field("data_source", &self.gateway.data_source())
            .field("codec", &self.codec)
            .finish()
    }
}

impl SettingsRepository {
    pub fn new(gateway: Arc<dyn StorageGateway>, codec: ValueCodec) -> Self {
        Self { gateway, codec }
    }

    pub fn data_source(&self) -> String {
        self.gateway.data_source()
    }

    pub fn gateway(&self) -> &Arc<dyn StorageGateway> {
        &self.gateway
    }

    pub fn codec(&self) -> &ValueCodec {
        &self.codec
    }

    /// Loads the stored entity.
    ///
    /// Starts from `T::default()` and overwrites every field whose column is
    /// present (exact name match) and not null. Columns without a matching
    /// field are ignored. Never changes the schema.
    pub fn get<T: SettingsEntity>(&self) -> SettingsResult<T> {
        let descriptor = checked_descriptor::<T>()?;
        let mut entity = T::default();
        let Some(row) = self.gateway.get_row(&descriptor.entity_type)? else {
            return Ok(entity);
        };

        for (column, stored) in row.iter() {
            let Some(field) = descriptor.field(&column.name) else {
                continue;
            };
            if let Some(value) = self.codec.decode(stored, field)? {
                entity.set_field_value(&field.name, value)?;
            }
        }
        Ok(entity)
    }

    /// The reconciliation [`update`](Self::update) would apply for `value`,
    /// without writing anything.
    pub fn plan_update<T: SettingsEntity>(&self, value: &T) -> SettingsResult<ReconcilePlan> {
        let descriptor = checked_descriptor::<T>()?;
        let row = self.gateway.get_row(&descriptor.entity_type)?;
        SchemaReconciler::new(&self.codec).plan(&descriptor, value, row.as_ref())
    }

    /// Persists `value`, reconciling the table's columns with the entity's
    /// current fields first.
    ///
    /// Not atomic: a storage failure part way through leaves whatever
    /// operations already ran in place.
    pub fn update<T: SettingsEntity>(&self, value: &T) -> SettingsResult<()> {
        let plan = self.plan_update(value)?;
        if plan.is_schema_change() {
            debug!(
                table = %plan.table,
                added = plan.added_columns().count(),
                dropped = plan.dropped_columns().count(),
                "reconciling settings schema"
            );
        }
        plan.apply(self.gateway.as_ref())
    }
}

fn checked_descriptor<T: SettingsEntity>() -> SettingsResult<EntityDescriptor> {
    let descriptor = T::descriptor();
    descriptor
        .validate()
        .map_err(|e| SettingsError::Configuration(e.to_string()))?;
    Ok(descriptor)
}
