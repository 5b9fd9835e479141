//! Example rate-limited endpoints

use axum::extract::Request;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::state::AppState;
use crate::api::types::{parse_json_body, ApiError};
use crate::domain::Admission;

#[derive(Debug, Clone, Deserialize)]
pub struct ExampleRequest {
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleResponse {
    pub success: bool,
    pub message: String,
    pub data: Value,
    pub processed_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExamplePing {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
}

/// POST /api/example-endpoint
pub async fn process_example(
    _state: AppState,
    request: Request,
    _admission: Admission,
) -> Result<ExampleResponse, ApiError> {
    let body: ExampleRequest = parse_json_body(request)
        .await
        .map_err(|_| ApiError::bad_request("Invalid request"))?;

    Ok(ExampleResponse {
        success: true,
        message: "Example endpoint processed successfully".to_string(),
        data: body.data,
        processed_at: Utc::now().to_rfc3339(),
    })
}

/// GET /api/example-endpoint
pub async fn ping_example(
    _state: AppState,
    _request: Request,
    _admission: Admission,
) -> Result<ExamplePing, ApiError> {
    Ok(ExamplePing {
        success: true,
        message: "GET request processed".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
