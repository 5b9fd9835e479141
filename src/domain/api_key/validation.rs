//! API Key validation utilities

use thiserror::Error;

/// Errors that can occur during API key validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiKeyValidationError {
    #[error("Name is required")]
    EmptyName,

    #[error("Name exceeds maximum length of {0} characters")]
    NameTooLong(usize),

    #[error("Limit must be a positive number")]
    InvalidLimit,

    #[error("Cost must be a positive number")]
    InvalidCost,

    #[error("Owner ID cannot be empty")]
    EmptyOwner,

    #[error("Invalid API key ID: {0}")]
    InvalidId(String),

    #[error("Invalid status '{0}'. Expected 'active' or 'inactive'")]
    InvalidStatus(String),
}

const MAX_API_KEY_NAME_LENGTH: usize = 100;

/// Minimum value accepted for a key's usage limit
pub const MIN_USAGE_LIMIT: f64 = 1.0;

/// Validate an API key display name
///
/// Rules:
/// - Cannot be empty or whitespace only
/// - Maximum 100 characters
pub fn validate_api_key_name(name: &str) -> Result<(), ApiKeyValidationError> {
    if name.trim().is_empty() {
        return Err(ApiKeyValidationError::EmptyName);
    }

    if name.chars().count() > MAX_API_KEY_NAME_LENGTH {
        return Err(ApiKeyValidationError::NameTooLong(MAX_API_KEY_NAME_LENGTH));
    }

    Ok(())
}

/// Validate a usage limit: finite and at least 1
pub fn validate_usage_limit(limit: f64) -> Result<(), ApiKeyValidationError> {
    if !limit.is_finite() || limit < MIN_USAGE_LIMIT {
        return Err(ApiKeyValidationError::InvalidLimit);
    }

    Ok(())
}

/// Validate a per-request cost: finite and strictly positive
pub fn validate_quota_cost(cost: f64) -> Result<(), ApiKeyValidationError> {
    if !cost.is_finite() || cost <= 0.0 {
        return Err(ApiKeyValidationError::InvalidCost);
    }

    Ok(())
}
