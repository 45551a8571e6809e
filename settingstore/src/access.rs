//! The settings access contracts.

use settingstore_model::SettingsEntity;

use crate::error::SettingsResult;
use crate::registry::Observer;

/// Typed access to settings entities plus change observation.
pub trait SettingsAccess: Send + Sync {
    /// The current value of `T`, defaults for anything not stored.
    fn get<T: SettingsEntity>(&self) -> SettingsResult<T>;

    /// Persists `value` and notifies `T`'s observers with the previous and
    /// new values.
    fn update<T: SettingsEntity>(&self, value: &T) -> SettingsResult<()>;

    fn subscribe<T: SettingsEntity>(&self, observer: Observer<T>);

    /// Returns whether the observer was registered.
    fn unsubscribe<T: SettingsEntity>(&self, observer: &Observer<T>) -> bool;
}

/// [`SettingsAccess`] with an in-memory override per entity type.
pub trait CachedSettingsAccess: SettingsAccess {
    /// Overrides what `get` returns for `T` without persisting, and notifies
    /// observers.
    fn set_cache_value<T: SettingsEntity>(&self, value: T) -> SettingsResult<()>;

    /// Drops the override for `T`, returning whether there was one.
    fn remove_cache_value<T: SettingsEntity>(&self) -> bool;
}
