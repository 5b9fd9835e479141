//! Rate-limited handler wrapper
//!
//! `with_rate_limit` puts the admission controller in front of a handler.
//! The handler only runs after its request was admitted and charged, and its
//! JSON payload is returned with the key's `usage` and `limit` merged in.

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{FromRef, Request, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::api::state::SharedAdmissionController;
use crate::api::types::ApiError;
use crate::domain::admission::{Admission, RateLimitConfig};
use crate::domain::api_key::quota_value;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Wrap `handler` so that every call is admitted against the caller's quota
///
/// The wrapped handler receives the application state, the untouched request
/// and the successful [`Admission`].
pub fn with_rate_limit<S, H, Fut, T>(
    handler: H,
    config: RateLimitConfig,
) -> impl Fn(State<S>, Request) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static
where
    S: Clone + Send + Sync + 'static,
    SharedAdmissionController: FromRef<S>,
    H: Fn(S, Request, Admission) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    T: Serialize + Send,
{
    let config = Arc::new(config);

    move |State(state): State<S>, request: Request| {
        let handler = handler.clone();
        let config = config.clone();

        let admitted: BoxFuture<'static, Response> = Box::pin(async move {
            let api_key = match extract_api_key(request.headers()) {
                Some(key) => key,
                None => return ApiError::bad_request("API key is required").into_response(),
            };

            let controller = SharedAdmissionController::from_ref(&state);
            let admission = match controller
                .admit(&config.endpoint, &api_key, config.increment_by)
                .await
            {
                Ok(admission) => admission,
                Err(e) => {
                    debug!(endpoint = %config.endpoint, error = %e, "Request not admitted");
                    return ApiError::from(e).into_response();
                }
            };

            let quota = admission.clone();

            match handler(state, request, admission).await {
                Ok(payload) => match merge_quota(payload, &quota) {
                    Ok(body) => (StatusCode::OK, Json(body)).into_response(),
                    Err(e) => e.into_response(),
                },
                Err(e) => e.into_response(),
            }
        });

        admitted
    }
}

/// Read the API key header; missing, empty or non-UTF-8 values count as absent
fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}

/// Add `usage` and `limit` to the payload, nesting non-objects under `data`
fn merge_quota<T: Serialize>(payload: T, admission: &Admission) -> Result<Value, ApiError> {
    let value = serde_json::to_value(payload).map_err(|e| {
        error!("Failed to serialize handler response: {}", e);
        ApiError::internal("Internal server error")
    })?;

    let mut object = match value {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };

    object.insert("usage".to_string(), quota_value(admission.usage));
    object.insert("limit".to_string(), quota_value(admission.limit));

    Ok(Value::Object(object))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{body::Body, routing::post, Router};
    use tower::ServiceExt;

    use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyStatus, OwnerId, QuotaCost};
    use crate::domain::EndpointCost;
    use crate::infrastructure::api_key::{AdmissionController, InMemoryApiKeyRepository};

    #[derive(Clone)]
    struct TestState {
        admission: SharedAdmissionController,
    }

    impl FromRef<TestState> for SharedAdmissionController {
        fn from_ref(state: &TestState) -> Self {
            state.admission.clone()
        }
    }

    fn test_state(keys: Vec<ApiKey>) -> TestState {
        let repository = Arc::new(InMemoryApiKeyRepository::with_keys(keys));
        TestState {
            admission: Arc::new(AdmissionController::new(repository)),
        }
    }

    fn key(secret: &str) -> ApiKey {
        ApiKey::new("test", secret, OwnerId::new("user-1").unwrap())
    }

    fn counting_router(state: TestState, calls: Arc<AtomicUsize>, cost: QuotaCost) -> Router {
        let handler = move |_state: TestState, _request: Request, _admission: Admission| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ApiError>(serde_json::json!({"success": true, "message": "done"}))
            }
        };

        Router::new()
            .route(
                "/work",
                post(with_rate_limit(
                    handler,
                    RateLimitConfig::new("work").with_increment_by(cost),
                )),
            )
            .with_state(state)
    }

    fn request(api_key: Option<&str>) -> Request {
        let mut builder = Request::builder().method("POST").uri("/work");
        if let Some(key) = api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_admitted_request_gets_quota_merged() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = counting_router(test_state(vec![key("sk-abc")]), calls.clone(), QuotaCost::one());

        let response = app.oneshot(request(Some("sk-abc"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(
            body,
            serde_json::json!({"success": true, "message": "done", "usage": 1, "limit": 1000})
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_key_is_bad_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = counting_router(test_state(vec![]), calls.clone(), QuotaCost::one());

        let response = app.oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"success": false, "error": "API key is required"})
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_key_is_bad_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = counting_router(test_state(vec![]), calls.clone(), QuotaCost::one());

        let response = app.oneshot(request(Some("  "))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_inactive_key_is_unauthorized() {
        let calls = Arc::new(AtomicUsize::new(0));
        let state = test_state(vec![key("sk-xyz").with_status(ApiKeyStatus::Inactive)]);
        let app = counting_router(state, calls.clone(), QuotaCost::one());

        let response = app.oneshot(request(Some("sk-xyz"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"success": false, "error": "Invalid or inactive API key"})
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exhausted_key_is_rate_limited() {
        let calls = Arc::new(AtomicUsize::new(0));
        let state = test_state(vec![key("sk-abc").with_usage(999.0)]);
        let app = counting_router(state, calls.clone(), QuotaCost::one());

        let first = app.clone().oneshot(request(Some("sk-abc"))).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(body_json(first).await["usage"], 1000);

        let second = app.oneshot(request(Some("sk-abc"))).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            body_json(second).await,
            serde_json::json!({
                "success": false,
                "error": "Rate limit exceeded",
                "usage": 1000,
                "limit": 1000
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fractional_cost_reported() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = counting_router(
            test_state(vec![key("sk-abc")]),
            calls,
            EndpointCost::Lightweight.cost(),
        );

        let response = app.oneshot(request(Some("sk-abc"))).await.unwrap();
        assert_eq!(body_json(response).await["usage"], serde_json::json!(0.5));
    }

    #[tokio::test]
    async fn test_handler_error_passes_through() {
        let handler = |_state: TestState, _request: Request, _admission: Admission| async {
            Err::<Value, _>(ApiError::not_found("Could not fetch README.md from repository"))
        };
        let app = Router::new()
            .route("/work", post(with_rate_limit(handler, RateLimitConfig::new("work"))))
            .with_state(test_state(vec![key("sk-abc")]));

        let response = app.oneshot(request(Some("sk-abc"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({
                "success": false,
                "error": "Could not fetch README.md from repository"
            })
        );
    }

    #[test]
    fn test_merge_quota_nests_non_objects() {
        let admission = Admission {
            key_id: ApiKeyId::generate(),
            usage: 2.0,
            limit: 10.0,
        };

        let merged = merge_quota(vec!["a", "b"], &admission).unwrap();
        assert_eq!(
            merged,
            serde_json::json!({"data": ["a", "b"], "usage": 2, "limit": 10})
        );
    }

    #[test]
    fn test_extract_api_key() {
        let mut headers = HeaderMap::new();
        assert!(extract_api_key(&headers).is_none());

        headers.insert(API_KEY_HEADER, " sk-abc ".parse().unwrap());
        assert_eq!(extract_api_key(&headers).as_deref(), Some("sk-abc"));

        headers.insert(API_KEY_HEADER, "".parse().unwrap());
        assert!(extract_api_key(&headers).is_none());
    }
}
