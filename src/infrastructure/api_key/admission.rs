//! Admission controller
//!
//! Validates a presented API key, enforces its quota and charges the
//! request against it with a single conditional increment.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::domain::admission::{Admission, AdmissionError};
use crate::domain::api_key::{fits_within_limit, ApiKeyRepository, QuotaCost, UsageIncrement};
use crate::infrastructure::observability::record_admission;

/// Gatekeeper in front of rate-limited endpoints
#[derive(Debug)]
pub struct AdmissionController<R>
where
    R: ApiKeyRepository,
{
    repository: Arc<R>,
}

impl<R: ApiKeyRepository> AdmissionController<R> {
    /// Create a new admission controller
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Admit or reject one request costing `cost` units for `key`
    ///
    /// At most one write reaches the store, and only after the key was found
    /// active with room for `cost`. A failed write rejects the request.
    pub async fn check_rate_limit(
        &self,
        key: &str,
        cost: QuotaCost,
    ) -> Result<Admission, AdmissionError> {
        let prefix: String = key.chars().take(8).collect();

        if key.is_empty() {
            debug!("Rejecting request with empty API key");
            return Err(AdmissionError::InvalidOrInactiveKey);
        }

        let api_key = match self.repository.get_active_by_key(key).await {
            Ok(Some(api_key)) => api_key,
            Ok(None) => {
                debug!(key = %prefix, "API key not found or inactive");
                return Err(AdmissionError::InvalidOrInactiveKey);
            }
            Err(e) => {
                error!(key = %prefix, error = %e, "API key lookup failed");
                return Err(AdmissionError::CheckFailed);
            }
        };

        let (usage, limit) = (api_key.usage(), api_key.limit());

        if !fits_within_limit(usage, cost, limit) {
            info!(key = %prefix, usage, limit, cost = cost.units(), "Rate limit exceeded");
            return Err(AdmissionError::RateLimitExceeded { usage, limit });
        }

        match self.repository.try_increment_usage(key, cost).await {
            Ok(UsageIncrement::Applied { usage, limit }) => {
                debug!(key = %prefix, usage, limit, "Request admitted");
                Ok(Admission {
                    key_id: *api_key.id(),
                    usage,
                    limit,
                })
            }
            Ok(UsageIncrement::Exhausted { usage, limit }) => {
                info!(key = %prefix, usage, limit, "Quota consumed by a concurrent request");
                Err(AdmissionError::RateLimitExceeded { usage, limit })
            }
            Ok(UsageIncrement::NotAdmissible) => {
                warn!(key = %prefix, "API key deactivated or deleted during admission");
                Err(AdmissionError::InvalidOrInactiveKey)
            }
            Err(e) => {
                error!(key = %prefix, error = %e, "Failed to increment API key usage");
                Err(AdmissionError::UsageUpdateFailed)
            }
        }
    }

    /// `check_rate_limit` plus the admission metric for `endpoint`
    pub async fn admit(
        &self,
        endpoint: &str,
        key: &str,
        cost: QuotaCost,
    ) -> Result<Admission, AdmissionError> {
        let result = self.check_rate_limit(key, cost).await;

        let outcome = match &result {
            Ok(_) => "admitted",
            Err(e) => e.outcome(),
        };
        record_admission(endpoint, outcome);

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::api_key::mock::MockApiKeyRepository;
    use crate::domain::api_key::{ApiKey, ApiKeyStatus, OwnerId};

    fn test_key(secret: &str) -> ApiKey {
        ApiKey::new("test", secret, OwnerId::new("user-1").unwrap())
    }

    async fn setup(keys: Vec<ApiKey>) -> (Arc<MockApiKeyRepository>, AdmissionController<MockApiKeyRepository>) {
        let repository = Arc::new(MockApiKeyRepository::new());
        for key in keys {
            repository.create(key).await.unwrap();
        }
        let controller = AdmissionController::new(repository.clone());
        (repository, controller)
    }

    async fn stored_usage(repository: &MockApiKeyRepository, secret: &str) -> f64 {
        repository
            .get_active_by_key(secret)
            .await
            .unwrap()
            .map(|k| k.usage())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_fresh_key_is_admitted() {
        let (repository, controller) = setup(vec![test_key("sk-abc")]).await;

        let admission = controller
            .check_rate_limit("sk-abc", QuotaCost::one())
            .await
            .unwrap();

        assert_eq!(admission.usage, 1.0);
        assert_eq!(admission.limit, 1000.0);
        assert_eq!(stored_usage(&repository, "sk-abc").await, 1.0);
    }

    #[tokio::test]
    async fn test_boundary_then_exceeded() {
        let (repository, controller) = setup(vec![test_key("sk-abc").with_usage(999.0)]).await;

        let admission = controller
            .check_rate_limit("sk-abc", QuotaCost::one())
            .await
            .unwrap();
        assert_eq!(admission.usage, 1000.0);

        let err = controller
            .check_rate_limit("sk-abc", QuotaCost::one())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AdmissionError::RateLimitExceeded {
                usage: 1000.0,
                limit: 1000.0
            }
        );
        assert_eq!(stored_usage(&repository, "sk-abc").await, 1000.0);
        assert_eq!(repository.increment_calls(), 1);
    }

    #[tokio::test]
    async fn test_fractional_cost() {
        let (_, controller) = setup(vec![test_key("sk-half").with_limit(1.0)]).await;
        let half = QuotaCost::new(0.5).unwrap();

        assert!(controller.check_rate_limit("sk-half", half).await.is_ok());
        let second = controller.check_rate_limit("sk-half", half).await.unwrap();
        assert_eq!(second.usage, 1.0);
        assert!(controller.check_rate_limit("sk-half", half).await.is_err());
    }

    #[tokio::test]
    async fn test_inactive_key_never_written() {
        let (repository, controller) =
            setup(vec![test_key("sk-xyz").with_status(ApiKeyStatus::Inactive)]).await;

        let err = controller
            .check_rate_limit("sk-xyz", QuotaCost::one())
            .await
            .unwrap_err();

        assert_eq!(err, AdmissionError::InvalidOrInactiveKey);
        assert_eq!(repository.increment_calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_and_empty_keys() {
        let (repository, controller) = setup(vec![]).await;

        assert_eq!(
            controller.check_rate_limit("sk-nope", QuotaCost::one()).await,
            Err(AdmissionError::InvalidOrInactiveKey)
        );
        assert_eq!(
            controller.check_rate_limit("", QuotaCost::one()).await,
            Err(AdmissionError::InvalidOrInactiveKey)
        );
        assert_eq!(repository.increment_calls(), 0);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_check_failed() {
        let (repository, controller) = setup(vec![test_key("sk-abc")]).await;
        repository.set_should_fail(true).await;

        let err = controller
            .check_rate_limit("sk-abc", QuotaCost::one())
            .await
            .unwrap_err();
        assert_eq!(err, AdmissionError::CheckFailed);
    }

    #[tokio::test]
    async fn test_increment_failure_fails_closed() {
        let (repository, controller) = setup(vec![test_key("sk-abc")]).await;
        repository.set_fail_increments(true).await;

        let err = controller
            .check_rate_limit("sk-abc", QuotaCost::one())
            .await
            .unwrap_err();

        assert_eq!(err, AdmissionError::UsageUpdateFailed);
        assert_eq!(stored_usage(&repository, "sk-abc").await, 0.0);
    }

    #[tokio::test]
    async fn test_concurrent_admissions_respect_capacity() {
        let (repository, controller) = setup(vec![test_key("sk-race").with_usage(995.0)]).await;
        let controller = Arc::new(controller);

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let controller = controller.clone();
                tokio::spawn(async move {
                    controller
                        .check_rate_limit("sk-race", QuotaCost::one())
                        .await
                })
            })
            .collect();

        let mut admitted = 0;
        let mut exceeded = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => admitted += 1,
                Err(AdmissionError::RateLimitExceeded { .. }) => exceeded += 1,
                Err(other) => panic!("unexpected admission error: {other}"),
            }
        }

        assert_eq!(admitted, 5);
        assert_eq!(exceeded, 15);
        assert_eq!(stored_usage(&repository, "sk-race").await, 1000.0);
    }

    #[tokio::test]
    async fn test_admit_passes_result_through() {
        let (_, controller) = setup(vec![test_key("sk-abc")]).await;

        let admission = controller
            .admit("example-endpoint", "sk-abc", QuotaCost::one())
            .await
            .unwrap();
        assert_eq!(admission.usage, 1.0);
    }
}
