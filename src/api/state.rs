//! Application state for shared services

use std::sync::Arc;

use axum::extract::FromRef;

use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyRepository, OwnerId, QuotaCost};
use crate::domain::{Admission, AdmissionError, DomainError, ReadmeFetcher, RepoSummarizer};
use crate::infrastructure::api_key::{
    AdmissionController, ApiKeyService, CreateApiKey, UpdateApiKey,
};
use crate::infrastructure::auth::JwtGenerator;

/// Admission controller shared by every rate-limited route
pub type SharedAdmissionController = Arc<dyn AdmissionControllerTrait>;

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub admission: SharedAdmissionController,
    pub api_key_service: Arc<dyn ApiKeyServiceTrait>,
    pub readme_fetcher: Arc<dyn ReadmeFetcher>,
    pub summarizer: Arc<dyn RepoSummarizer>,
    pub jwt_service: Arc<dyn JwtGenerator>,
}

/// Trait for admission control
#[async_trait::async_trait]
pub trait AdmissionControllerTrait: Send + Sync {
    async fn admit(
        &self,
        endpoint: &str,
        key: &str,
        cost: QuotaCost,
    ) -> Result<Admission, AdmissionError>;
}

/// Trait for API key service operations
#[async_trait::async_trait]
pub trait ApiKeyServiceTrait: Send + Sync {
    async fn create(&self, owner: &OwnerId, request: CreateApiKey) -> Result<ApiKey, DomainError>;
    async fn list(&self, owner: &OwnerId) -> Result<Vec<ApiKey>, DomainError>;
    async fn get(&self, owner: &OwnerId, id: &ApiKeyId) -> Result<ApiKey, DomainError>;
    async fn update(
        &self,
        owner: &OwnerId,
        id: &ApiKeyId,
        changes: UpdateApiKey,
    ) -> Result<ApiKey, DomainError>;
    async fn reset_usage(&self, owner: &OwnerId, id: &ApiKeyId) -> Result<ApiKey, DomainError>;
    async fn delete(&self, owner: &OwnerId, id: &ApiKeyId) -> Result<ApiKey, DomainError>;
    async fn validate(&self, key: &str) -> Result<bool, DomainError>;
    async fn count(&self) -> Result<usize, DomainError>;
}

// Implement traits for the actual services

#[async_trait::async_trait]
impl<R: ApiKeyRepository + 'static> AdmissionControllerTrait for AdmissionController<R> {
    async fn admit(
        &self,
        endpoint: &str,
        key: &str,
        cost: QuotaCost,
    ) -> Result<Admission, AdmissionError> {
        AdmissionController::admit(self, endpoint, key, cost).await
    }
}

#[async_trait::async_trait]
impl<R: ApiKeyRepository + 'static> ApiKeyServiceTrait for ApiKeyService<R> {
    async fn create(&self, owner: &OwnerId, request: CreateApiKey) -> Result<ApiKey, DomainError> {
        ApiKeyService::create(self, owner, request).await
    }

    async fn list(&self, owner: &OwnerId) -> Result<Vec<ApiKey>, DomainError> {
        ApiKeyService::list(self, owner).await
    }

    async fn get(&self, owner: &OwnerId, id: &ApiKeyId) -> Result<ApiKey, DomainError> {
        ApiKeyService::get(self, owner, id).await
    }

    async fn update(
        &self,
        owner: &OwnerId,
        id: &ApiKeyId,
        changes: UpdateApiKey,
    ) -> Result<ApiKey, DomainError> {
        ApiKeyService::update(self, owner, id, changes).await
    }

    async fn reset_usage(&self, owner: &OwnerId, id: &ApiKeyId) -> Result<ApiKey, DomainError> {
        ApiKeyService::reset_usage(self, owner, id).await
    }

    async fn delete(&self, owner: &OwnerId, id: &ApiKeyId) -> Result<ApiKey, DomainError> {
        ApiKeyService::delete(self, owner, id).await
    }

    async fn validate(&self, key: &str) -> Result<bool, DomainError> {
        ApiKeyService::validate(self, key).await
    }

    async fn count(&self) -> Result<usize, DomainError> {
        ApiKeyService::count(self).await
    }
}

impl FromRef<AppState> for SharedAdmissionController {
    fn from_ref(state: &AppState) -> Self {
        state.admission.clone()
    }
}

impl AppState {
    /// Create new application state with provided services
    pub fn new(
        admission: SharedAdmissionController,
        api_key_service: Arc<dyn ApiKeyServiceTrait>,
        readme_fetcher: Arc<dyn ReadmeFetcher>,
        summarizer: Arc<dyn RepoSummarizer>,
        jwt_service: Arc<dyn JwtGenerator>,
    ) -> Self {
        Self {
            admission,
            api_key_service,
            readme_fetcher,
            summarizer,
            jwt_service,
        }
    }

    /// Wire the key service and admission controller over one repository
    pub fn with_repository<R: ApiKeyRepository + 'static>(
        repository: Arc<R>,
        service: ApiKeyService<R>,
        readme_fetcher: Arc<dyn ReadmeFetcher>,
        summarizer: Arc<dyn RepoSummarizer>,
        jwt_service: Arc<dyn JwtGenerator>,
    ) -> Self {
        Self::new(
            Arc::new(AdmissionController::new(repository)),
            Arc::new(service),
            readme_fetcher,
            summarizer,
            jwt_service,
        )
    }
}
