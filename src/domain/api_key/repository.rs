//! API Key repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{ApiKey, ApiKeyId, OwnerId};
use super::quota::QuotaCost;
use crate::domain::DomainError;

/// Result of a conditional usage increment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UsageIncrement {
    /// The cost was charged; values are after the increment
    Applied { usage: f64, limit: f64 },
    /// The key exists and is active but the cost no longer fits
    Exhausted { usage: f64, limit: f64 },
    /// The key is gone or no longer active
    NotAdmissible,
}

/// Repository trait for API key storage
#[async_trait]
pub trait ApiKeyRepository: Send + Sync + Debug {
    /// Get an API key by its ID
    async fn get(&self, id: &ApiKeyId) -> Result<Option<ApiKey>, DomainError>;

    /// Look up the single active key whose secret equals `key`
    async fn get_active_by_key(&self, key: &str) -> Result<Option<ApiKey>, DomainError>;

    /// List the keys of one owner, newest first
    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<ApiKey>, DomainError>;

    /// Create a new API key; fails with `Conflict` if the secret is taken
    async fn create(&self, api_key: ApiKey) -> Result<ApiKey, DomainError>;

    /// Persist name, status and limit of an existing key. Usage is left untouched.
    async fn update(&self, api_key: &ApiKey) -> Result<ApiKey, DomainError>;

    /// Set usage back to zero
    async fn reset_usage(&self, id: &ApiKeyId) -> Result<ApiKey, DomainError>;

    /// Delete an API key
    async fn delete(&self, id: &ApiKeyId) -> Result<bool, DomainError>;

    /// Atomically add `cost` to the usage of the active key `key`, only if
    /// the result stays within its limit.
    async fn try_increment_usage(
        &self,
        key: &str,
        cost: QuotaCost,
    ) -> Result<UsageIncrement, DomainError>;

    /// Count stored API keys
    async fn count(&self) -> Result<usize, DomainError>;
}
