//! API Key service
//!
//! Owner-scoped key management. Every lookup is filtered by owner and a key
//! belonging to someone else is reported as not found.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::api_key::{
    validate_api_key_name, validate_usage_limit, ApiKey, ApiKeyId, ApiKeyRepository,
    ApiKeyStatus, OwnerId, DEFAULT_USAGE_LIMIT,
};
use crate::domain::DomainError;

use super::generator::ApiKeyGenerator;

/// Fields accepted when creating a key
#[derive(Debug, Clone)]
pub struct CreateApiKey {
    pub name: String,
    pub status: Option<ApiKeyStatus>,
    pub limit: Option<f64>,
}

/// Partial update of a key; `None` leaves the field unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateApiKey {
    pub name: Option<String>,
    pub status: Option<ApiKeyStatus>,
    pub limit: Option<f64>,
}

/// API Key service for managing API keys
#[derive(Debug)]
pub struct ApiKeyService<R>
where
    R: ApiKeyRepository,
{
    repository: Arc<R>,
    generator: ApiKeyGenerator,
    default_limit: f64,
}

impl<R: ApiKeyRepository> ApiKeyService<R> {
    /// Create a new API key service
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            generator: ApiKeyGenerator::default(),
            default_limit: DEFAULT_USAGE_LIMIT,
        }
    }

    /// Create with a custom generator
    pub fn with_generator(mut self, generator: ApiKeyGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Override the limit given to keys created without one
    pub fn with_default_limit(mut self, limit: f64) -> Self {
        self.default_limit = limit;
        self
    }

    /// Create a new API key for `owner`
    pub async fn create(&self, owner: &OwnerId, request: CreateApiKey) -> Result<ApiKey, DomainError> {
        validate_api_key_name(&request.name).map_err(|e| DomainError::validation(e.to_string()))?;

        let limit = request.limit.unwrap_or(self.default_limit);
        validate_usage_limit(limit).map_err(|e| DomainError::validation(e.to_string()))?;

        let name = request.name.trim().to_string();
        info!("Creating API key: owner={}, name={}", owner, name);

        let api_key = ApiKey::new(name, self.generator.generate(), owner.clone())
            .with_status(request.status.unwrap_or_default())
            .with_limit(limit);

        let created = self.repository.create(api_key).await?;

        info!("API key created: id={}, key={}", created.id(), created.key_prefix());

        Ok(created)
    }

    /// List the keys of `owner`, newest first
    pub async fn list(&self, owner: &OwnerId) -> Result<Vec<ApiKey>, DomainError> {
        self.repository.list_by_owner(owner).await
    }

    /// Get a key owned by `owner`
    pub async fn get(&self, owner: &OwnerId, id: &ApiKeyId) -> Result<ApiKey, DomainError> {
        self.repository
            .get(id)
            .await?
            .filter(|key| key.is_owned_by(owner))
            .ok_or_else(|| DomainError::not_found(format!("API key '{}' not found", id)))
    }

    /// Update name, status or limit of an owned key
    pub async fn update(
        &self,
        owner: &OwnerId,
        id: &ApiKeyId,
        changes: UpdateApiKey,
    ) -> Result<ApiKey, DomainError> {
        if let Some(name) = &changes.name {
            validate_api_key_name(name).map_err(|e| DomainError::validation(e.to_string()))?;
        }
        if let Some(limit) = changes.limit {
            validate_usage_limit(limit).map_err(|e| DomainError::validation(e.to_string()))?;
        }

        let mut key = self.get(owner, id).await?;
        info!("Updating API key: id={}", id);

        if let Some(name) = changes.name {
            key.set_name(name.trim());
        }
        if let Some(status) = changes.status {
            key.set_status(status);
        }
        if let Some(limit) = changes.limit {
            key.set_limit(limit);
        }

        self.repository.update(&key).await
    }

    /// Set the usage of an owned key back to zero
    pub async fn reset_usage(&self, owner: &OwnerId, id: &ApiKeyId) -> Result<ApiKey, DomainError> {
        self.get(owner, id).await?;
        info!("Resetting API key usage: id={}", id);
        self.repository.reset_usage(id).await
    }

    /// Delete an owned key, returning it
    pub async fn delete(&self, owner: &OwnerId, id: &ApiKeyId) -> Result<ApiKey, DomainError> {
        let key = self.get(owner, id).await?;
        info!("Deleting API key: id={}", id);

        if !self.repository.delete(id).await? {
            return Err(DomainError::not_found(format!("API key '{}' not found", id)));
        }

        Ok(key)
    }

    /// Whether `key` names an active key. Does not charge usage.
    pub async fn validate(&self, key: &str) -> Result<bool, DomainError> {
        if key.is_empty() {
            return Ok(false);
        }

        let found = self.repository.get_active_by_key(key).await?;
        debug!("Validated API key: valid={}", found.is_some());

        Ok(found.is_some())
    }

    /// Number of stored keys, used by readiness checks
    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }
}
