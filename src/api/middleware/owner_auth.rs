//! Owner authentication using JWT bearer tokens

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::api_key::OwnerId;

/// Extractor that requires a valid JWT and yields the owner it names
///
/// The token is read from `Authorization: Bearer <jwt>`. Every failure is
/// reported as 401 `Unauthorized`.
#[derive(Debug, Clone)]
pub struct RequireOwner(pub OwnerId);

impl FromRequestParts<AppState> for RequireOwner {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_jwt_token(&parts.headers).ok_or_else(unauthorized)?;

        let claims = state.jwt_service.validate(&token).map_err(|e| {
            debug!(error = %e, "Rejected owner token");
            unauthorized()
        })?;

        let owner = claims.owner().map_err(|_| unauthorized())?;

        Ok(RequireOwner(owner))
    }
}

fn unauthorized() -> ApiError {
    ApiError::unauthorized("Unauthorized")
}

/// Extract the bearer token from the Authorization header
pub fn extract_jwt_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}
