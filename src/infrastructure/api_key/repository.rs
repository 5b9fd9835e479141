//! In-memory API key repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::api_key::{
    fits_within_limit, ApiKey, ApiKeyId, ApiKeyRepository, OwnerId, QuotaCost, UsageIncrement,
};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Store {
    keys: HashMap<ApiKeyId, ApiKey>,
    /// secret -> id
    key_index: HashMap<String, ApiKeyId>,
}

/// In-memory implementation of ApiKeyRepository
///
/// Both maps live behind one lock, so the limit check and the usage write of
/// `try_increment_usage` happen under the same write guard.
#[derive(Debug, Default)]
pub struct InMemoryApiKeyRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryApiKeyRepository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository with initial keys
    pub fn with_keys(keys: Vec<ApiKey>) -> Self {
        let store = Store {
            key_index: keys.iter().map(|k| (k.key().to_string(), *k.id())).collect(),
            keys: keys.into_iter().map(|k| (*k.id(), k)).collect(),
        };

        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn get(&self, id: &ApiKeyId) -> Result<Option<ApiKey>, DomainError> {
        let store = self.store.read().await;
        Ok(store.keys.get(id).cloned())
    }

    async fn get_active_by_key(&self, key: &str) -> Result<Option<ApiKey>, DomainError> {
        let store = self.store.read().await;

        Ok(store
            .key_index
            .get(key)
            .and_then(|id| store.keys.get(id))
            .filter(|k| k.is_active())
            .cloned())
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<ApiKey>, DomainError> {
        let store = self.store.read().await;

        let mut keys: Vec<ApiKey> = store
            .keys
            .values()
            .filter(|k| k.is_owned_by(owner))
            .cloned()
            .collect();
        keys.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        Ok(keys)
    }

    async fn create(&self, api_key: ApiKey) -> Result<ApiKey, DomainError> {
        let mut store = self.store.write().await;

        if store.keys.contains_key(api_key.id()) {
            return Err(DomainError::conflict(format!(
                "API key with ID '{}' already exists",
                api_key.id()
            )));
        }

        if store.key_index.contains_key(api_key.key()) {
            return Err(DomainError::conflict("API key secret already exists"));
        }

        store.key_index.insert(api_key.key().to_string(), *api_key.id());
        store.keys.insert(*api_key.id(), api_key.clone());

        Ok(api_key)
    }

    async fn update(&self, api_key: &ApiKey) -> Result<ApiKey, DomainError> {
        let mut store = self.store.write().await;

        let stored = store.keys.get_mut(api_key.id()).ok_or_else(|| {
            DomainError::not_found(format!("API key '{}' not found", api_key.id()))
        })?;

        stored.set_name(api_key.name());
        stored.set_status(api_key.status());
        stored.set_limit(api_key.limit());

        Ok(stored.clone())
    }

    async fn reset_usage(&self, id: &ApiKeyId) -> Result<ApiKey, DomainError> {
        let mut store = self.store.write().await;

        let stored = store
            .keys
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found(format!("API key '{}' not found", id)))?;
        stored.reset_usage();

        Ok(stored.clone())
    }

    async fn delete(&self, id: &ApiKeyId) -> Result<bool, DomainError> {
        let mut store = self.store.write().await;

        if let Some(key) = store.keys.remove(id) {
            store.key_index.remove(key.key());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn try_increment_usage(
        &self,
        key: &str,
        cost: QuotaCost,
    ) -> Result<UsageIncrement, DomainError> {
        let mut store = self.store.write().await;

        let Some(id) = store.key_index.get(key).copied() else {
            return Ok(UsageIncrement::NotAdmissible);
        };

        let Some(stored) = store.keys.get_mut(&id).filter(|k| k.is_active()) else {
            return Ok(UsageIncrement::NotAdmissible);
        };

        if !fits_within_limit(stored.usage(), cost, stored.limit()) {
            return Ok(UsageIncrement::Exhausted {
                usage: stored.usage(),
                limit: stored.limit(),
            });
        }

        stored.charge(cost);

        Ok(UsageIncrement::Applied {
            usage: stored.usage(),
            limit: stored.limit(),
        })
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.store.read().await.keys.len())
    }
}
