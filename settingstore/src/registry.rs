//! Per-entity-type observer registry.

use dashmap::DashMap;
use settingstore_model::{SettingsChange, SettingsEntity};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::{SettingsError, SettingsResult};

type ObserverFn<T> = dyn Fn(&SettingsChange<T>) -> anyhow::Result<()> + Send + Sync;

/// Identity of a registered observer: its callback allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(usize);

/// A change callback for entity type `T`.
///
/// Clones share one callback and therefore one identity, so a clone can be
/// used to unsubscribe the original.
pub struct Observer<T> {
    callback: Arc<ObserverFn<T>>,
}

impl<T> Observer<T> {
    pub fn new(
        callback: impl Fn(&SettingsChange<T>) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }

    pub fn id(&self) -> ObserverId {
        ObserverId(Arc::as_ptr(&self.callback) as *const () as usize)
    }

    pub fn call(&self, change: &SettingsChange<T>) -> anyhow::Result<()> {
        (self.callback)(change)
    }
}

impl<T> Clone for Observer<T> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<T> fmt::Debug for Observer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Observer").field(&self.id()).finish()
    }
}

type ErasedObserver = Arc<dyn Any + Send + Sync>;

/// Observers keyed by entity type.
///
/// Safe for concurrent use. [`notify`](Self::notify) snapshots the observer
/// set and releases the map before invoking anything, so observers may
/// subscribe or unsubscribe from inside a callback. A notification that took
/// its snapshot before an `unsubscribe` returned can still reach that
/// observer; later ones cannot.
#[derive(Default)]
pub struct SubscriberRegistry {
    observers: DashMap<TypeId, HashMap<ObserverId, ErasedObserver>>,
}

impl fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("entity_types", &self.observers.len())
            .finish()
    }
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `observer`. Registering the same observer again is a no-op.
    pub fn subscribe<T: SettingsEntity>(&self, observer: Observer<T>) {
        let id = observer.id();
        self.observers
            .entry(TypeId::of::<T>())
            .or_default()
            .entry(id)
            .or_insert_with(|| Arc::new(observer) as ErasedObserver);
        debug!(entity = %T::entity_type(), "observer subscribed");
    }

    /// Removes `observer`, returning whether it was registered.
    pub fn unsubscribe<T: SettingsEntity>(&self, observer: &Observer<T>) -> bool {
        let removed = self
            .observers
            .get_mut(&TypeId::of::<T>())
            .is_some_and(|mut set| set.remove(&observer.id()).is_some());
        self.observers
            .remove_if(&TypeId::of::<T>(), |_, set| set.is_empty());
        removed
    }

    pub fn subscriber_count<T: SettingsEntity>(&self) -> usize {
        self.observers
            .get(&TypeId::of::<T>())
            .map_or(0, |set| set.len())
    }

    /// Delivers `change` to every observer of `T`, in no particular order.
    ///
    /// The first observer error stops delivery and is returned.
    pub fn notify<T: SettingsEntity>(&self, change: &SettingsChange<T>) -> SettingsResult<()> {
        let snapshot: Vec<ErasedObserver> = self
            .observers
            .get(&TypeId::of::<T>())
            .map(|set| set.values().cloned().collect())
            .unwrap_or_default();

        for erased in &snapshot {
            if let Some(observer) = erased.as_ref().downcast_ref::<Observer<T>>() {
                observer.call(change).map_err(SettingsError::Observer)?;
            }
        }
        Ok(())
    }
}
