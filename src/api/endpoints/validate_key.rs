//! API key validation endpoint

use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, JsonRejection};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateKeyRequest {
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidateKeyResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /api/validate-key
///
/// Reports whether the key exists and is active. Usage is never charged.
pub async fn validate_key(
    State(state): State<AppState>,
    request: Result<Json<ValidateKeyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ValidateKeyResponse>), ApiError> {
    let Ok(Json(request)) = request else {
        return Ok(invalid("Invalid request"));
    };

    let Some(key) = request.api_key.filter(|k| !k.is_empty()) else {
        return Ok(invalid("apiKey is required"));
    };

    let valid = state.api_key_service.validate(&key).await?;
    debug!(valid, "Validated API key");

    Ok((StatusCode::OK, Json(ValidateKeyResponse { valid, error: None })))
}

fn invalid(error: &str) -> (StatusCode, Json<ValidateKeyResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ValidateKeyResponse {
            valid: false,
            error: Some(error.to_string()),
        }),
    )
}
