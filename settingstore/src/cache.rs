//! In-memory overlay answering reads without touching storage.

use dashmap::DashMap;
use settingstore_model::{SettingsChange, SettingsEntity};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::access::{CachedSettingsAccess, SettingsAccess};
use crate::error::SettingsResult;
use crate::registry::{Observer, SubscriberRegistry};

/// Wraps a [`SettingsAccess`] with a per-type override store.
///
/// `get` returns the cached value when there is one and otherwise delegates
/// without filling the cache; only [`set_cache_value`] fills it. The overlay
/// has its own observers, notified by `set_cache_value` and `update` with the
/// value `get` returned just before.
///
/// [`set_cache_value`]: CachedSettingsAccess::set_cache_value
pub struct CachedSettingsManager<M> {
    inner: M,
    cache: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    registry: SubscriberRegistry,
}

impl<M: fmt::Debug> fmt::Debug for CachedSettingsManager<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedSettingsManager")
            .field("inner", &self.inner)
            .field("cached_types", &self.cache.len())
            .finish()
    }
}

impl<M: SettingsAccess> CachedSettingsManager<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
            registry: SubscriberRegistry::new(),
        }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn registry(&self) -> &SubscriberRegistry {
        &self.registry
    }

    pub fn is_cached<T: SettingsEntity>(&self) -> bool {
        self.cache.contains_key(&TypeId::of::<T>())
    }

    fn cached<T: SettingsEntity>(&self) -> Option<T> {
        self.cache
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.value().as_ref().downcast_ref::<T>().cloned())
    }
}

impl<M: SettingsAccess> SettingsAccess for CachedSettingsManager<M> {
    fn get<T: SettingsEntity>(&self) -> SettingsResult<T> {
        match self.cached::<T>() {
            Some(value) => Ok(value),
            None => self.inner.get(),
        }
    }

    fn update<T: SettingsEntity>(&self, value: &T) -> SettingsResult<()> {
        let old = self.get::<T>()?;
        if self.cache.remove(&TypeId::of::<T>()).is_some() {
            debug!(entity = %T::entity_type(), "cached settings evicted by update");
        }
        self.inner.update(value)?;
        self.registry
            .notify(&SettingsChange::new(old, value.clone()))
    }

    fn subscribe<T: SettingsEntity>(&self, observer: Observer<T>) {
        self.registry.subscribe(observer);
    }

    fn unsubscribe<T: SettingsEntity>(&self, observer: &Observer<T>) -> bool {
        self.registry.unsubscribe(observer)
    }
}

impl<M: SettingsAccess> CachedSettingsAccess for CachedSettingsManager<M> {
    fn set_cache_value<T: SettingsEntity>(&self, value: T) -> SettingsResult<()> {
        let old = self.get::<T>()?;
        self.cache
            .insert(TypeId::of::<T>(), Arc::new(value.clone()));
        debug!(entity = %T::entity_type(), "settings cached");
        self.registry.notify(&SettingsChange::new(old, value))
    }

    fn remove_cache_value<T: SettingsEntity>(&self) -> bool {
        let removed = self.cache.remove(&TypeId::of::<T>()).is_some();
        if removed {
            debug!(entity = %T::entity_type(), "cached settings removed");
        }
        removed
    }
}
