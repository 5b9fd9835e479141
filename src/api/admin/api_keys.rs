//! API key management endpoints
//!
//! Every route requires an owner JWT and only ever sees that owner's keys.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::api::middleware::RequireOwner;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyStatus, ApiKeyValidationError};
use crate::infrastructure::api_key::{CreateApiKey, UpdateApiKey};

/// Request to create a new API key
#[derive(Debug, Clone, Deserialize)]
pub struct CreateApiKeyRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<ApiKeyStatus>,
    #[serde(default)]
    pub limit: Option<Value>,
}

impl TryFrom<CreateApiKeyRequest> for CreateApiKey {
    type Error = ApiError;

    fn try_from(req: CreateApiKeyRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: req.name,
            status: req.status,
            limit: numeric_limit(req.limit)?,
        })
    }
}

/// Request to update an API key; usage cannot be set here
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateApiKeyRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<ApiKeyStatus>,
    #[serde(default)]
    pub limit: Option<Value>,
}

impl TryFrom<UpdateApiKeyRequest> for UpdateApiKey {
    type Error = ApiError;

    fn try_from(req: UpdateApiKeyRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: req.name,
            status: req.status,
            limit: numeric_limit(req.limit)?,
        })
    }
}

/// Only JSON numbers are accepted as limits; range checks happen in the service
fn numeric_limit(limit: Option<Value>) -> Result<Option<f64>, ApiError> {
    match limit {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| ApiError::bad_request(ApiKeyValidationError::InvalidLimit.to_string())),
    }
}

/// `{success: true, data}` envelope
#[derive(Debug, Clone, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    fn new(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

/// Malformed identifiers cannot name an existing key
fn parse_key_id(key_id: &str) -> Result<ApiKeyId, ApiError> {
    ApiKeyId::parse(key_id).map_err(|_| ApiError::not_found("Not found"))
}

/// GET /api/keys
pub async fn list_api_keys(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
) -> Result<Json<DataResponse<Vec<ApiKey>>>, ApiError> {
    debug!(owner = %owner, "Listing API keys");

    let keys = state.api_key_service.list(&owner).await?;

    Ok(DataResponse::new(keys))
}

/// POST /api/keys
pub async fn create_api_key(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Json(request): Json<CreateApiKeyRequest>,
) -> Result<(StatusCode, Json<DataResponse<ApiKey>>), ApiError> {
    debug!(owner = %owner, name = %request.name, "Creating API key");

    let key = state
        .api_key_service
        .create(&owner, request.try_into()?)
        .await?;

    Ok((StatusCode::CREATED, DataResponse::new(key)))
}

/// GET /api/keys/{key_id}
pub async fn get_api_key(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Path(key_id): Path<String>,
) -> Result<Json<DataResponse<ApiKey>>, ApiError> {
    let id = parse_key_id(&key_id)?;

    let key = state.api_key_service.get(&owner, &id).await?;

    Ok(DataResponse::new(key))
}

/// PUT /api/keys/{key_id}
pub async fn update_api_key(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Path(key_id): Path<String>,
    Json(request): Json<UpdateApiKeyRequest>,
) -> Result<Json<DataResponse<ApiKey>>, ApiError> {
    let id = parse_key_id(&key_id)?;
    debug!(owner = %owner, key_id = %id, "Updating API key");

    let key = state
        .api_key_service
        .update(&owner, &id, request.try_into()?)
        .await?;

    Ok(DataResponse::new(key))
}

/// POST /api/keys/{key_id}/reset-usage
pub async fn reset_api_key_usage(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Path(key_id): Path<String>,
) -> Result<Json<DataResponse<ApiKey>>, ApiError> {
    let id = parse_key_id(&key_id)?;
    debug!(owner = %owner, key_id = %id, "Resetting API key usage");

    let key = state.api_key_service.reset_usage(&owner, &id).await?;

    Ok(DataResponse::new(key))
}

/// DELETE /api/keys/{key_id}
pub async fn delete_api_key(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Path(key_id): Path<String>,
) -> Result<Json<DataResponse<ApiKey>>, ApiError> {
    let id = parse_key_id(&key_id)?;
    debug!(owner = %owner, key_id = %id, "Deleting API key");

    let key = state.api_key_service.delete(&owner, &id).await?;

    Ok(DataResponse::new(key))
}
