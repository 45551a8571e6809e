use crate::error::ModelResult;
use crate::schema::EntityDescriptor;
use crate::value::FieldValue;

/// A settings entity: one cohesive group of configuration values, persisted
/// as the single row of its own table.
///
/// Implementations declare their shape statically through [`descriptor`] and
/// move values in and out by field name, which is everything the persistence
/// layer needs to know about the type.
///
/// [`descriptor`]: SettingsEntity::descriptor
pub trait SettingsEntity: Default + Clone + Send + Sync + 'static {
    /// The entity's table name and field list.
    fn descriptor() -> EntityDescriptor;

    /// Current value of a field, or `None` if the entity has no such field.
    fn field_value(&self, name: &str) -> Option<FieldValue>;

    /// Assigns a decoded value to a field.
    fn set_field_value(&mut self, name: &str, value: FieldValue) -> ModelResult<()>;

    /// The table name. Defaults to the descriptor's entity type.
    fn entity_type() -> String {
        Self::descriptor().entity_type
    }
}

/// A Rust enum stored as its member name.
pub trait SettingsEnum: Sized {
    /// Every member name, in declaration order.
    const MEMBERS: &'static [&'static str];

    /// Member name of this value.
    fn name(&self) -> &'static str;

    /// Parses an exact member name.
    fn from_name(name: &str) -> Option<Self>;
}

/// The change record delivered to observers after a successful update.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsChange<T> {
    pub old: T,
    pub new: T,
}

impl<T> SettingsChange<T> {
    pub fn new(old: T, new: T) -> Self {
        Self { old, new }
    }
}
