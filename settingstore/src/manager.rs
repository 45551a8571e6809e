//! The settings facade and its builder.

use serde::{Deserialize, Serialize};
use settingstore_crypto::EncryptionProvider;
use settingstore_model::{SettingsChange, SettingsEntity};
use settingstore_storage::{open_gateway, StorageGateway, StoreConfig};
use std::sync::Arc;
use tracing::{debug, info};

use crate::access::SettingsAccess;
use crate::codec::{SensitiveFieldPolicy, ValueCodec};
use crate::error::{SettingsError, SettingsResult};
use crate::registry::{Observer, SubscriberRegistry};
use crate::repository::SettingsRepository;

/// Deserializable manager configuration.
///
/// ```json
/// {
///   "store": { "backend": "sqlite", "path": "/var/lib/app/settings.db" },
///   "sensitive_fields": "strict"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsConfig {
    pub store: StoreConfig,
    #[serde(default)]
    pub sensitive_fields: SensitiveFieldPolicy,
}

/// Repository plus observer registry behind [`SettingsAccess`].
///
/// Each manager owns its registry; observers registered on one manager are
/// never notified by another. Updates of the same entity type must be
/// serialised by the caller (see [`SettingsRepository::update`]).
#[derive(Debug)]
pub struct SettingsManager {
    repository: SettingsRepository,
    registry: SubscriberRegistry,
}

impl SettingsManager {
    pub fn new(repository: SettingsRepository) -> Self {
        Self {
            repository,
            registry: SubscriberRegistry::new(),
        }
    }

    pub fn builder() -> SettingsManagerBuilder {
        SettingsManagerBuilder::default()
    }

    pub fn repository(&self) -> &SettingsRepository {
        &self.repository
    }

    pub fn registry(&self) -> &SubscriberRegistry {
        &self.registry
    }

    pub fn data_source(&self) -> String {
        self.repository.data_source()
    }
}

impl SettingsAccess for SettingsManager {
    fn get<T: SettingsEntity>(&self) -> SettingsResult<T> {
        self.repository.get()
    }

    /// Observers run after the value is persisted; an observer error is
    /// returned but does not undo the update.
    fn update<T: SettingsEntity>(&self, value: &T) -> SettingsResult<()> {
        let old = self.repository.get::<T>()?;
        self.repository.update(value)?;
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

/// Builds a [`SettingsManager`].
///
/// A gateway is required, either directly or through a [`StoreConfig`]; an
/// explicit gateway wins when both are given.
#[derive(Default)]
pub struct SettingsManagerBuilder {
    gateway: Option<Arc<dyn StorageGateway>>,
    store_config: Option<StoreConfig>,
    encryption: Option<Arc<dyn EncryptionProvider>>,
    policy: SensitiveFieldPolicy,
}

impl SettingsManagerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder preloaded from a [`SettingsConfig`].
    pub fn from_config(config: SettingsConfig) -> Self {
        Self::new()
            .store_config(config.store)
            .sensitive_field_policy(config.sensitive_fields)
    }

    pub fn gateway(mut self, gateway: Arc<dyn StorageGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn store_config(mut self, config: StoreConfig) -> Self {
        self.store_config = Some(config);
        self
    }

    pub fn encryption(mut self, provider: Arc<dyn EncryptionProvider>) -> Self {
        self.encryption = Some(provider);
        self
    }

    pub fn sensitive_field_policy(mut self, policy: SensitiveFieldPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> SettingsResult<SettingsManager> {
        let gateway = match (self.gateway, self.store_config) {
            (Some(gateway), config) => {
                if config.is_some() {
                    debug!("explicit gateway given, ignoring store config");
                }
                gateway
            }
            (None, Some(config)) => open_gateway(&config)?,
            (None, None) => {
                return Err(SettingsError::Configuration(
                    "no storage gateway or store config supplied".into(),
                ));
            }
        };

        info!(
            data_source = %gateway.data_source(),
            encrypted = self.encryption.is_some(),
            policy = ?self.policy,
            "settings manager ready"
        );
        let codec = ValueCodec::new(self.encryption, self.policy);
        Ok(SettingsManager::new(SettingsRepository::new(gateway, codec)))
    }
}
