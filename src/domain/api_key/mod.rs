//! API Key domain
//!
//! Domain types and traits for API keys: the stored entity, its quota
//! arithmetic, validation rules and the repository contract used by both
//! key management and admission control.

mod entity;
pub(crate) mod quota;
mod repository;
mod validation;

pub use entity::{ApiKey, ApiKeyId, ApiKeyStatus, OwnerId};
pub use quota::{
    fits_within_limit, quota_value, serialize_optional_quota, serialize_quota, QuotaCost,
    DEFAULT_USAGE_LIMIT,
};
pub use repository::{ApiKeyRepository, UsageIncrement};
pub use validation::{
    validate_api_key_name, validate_quota_cost, validate_usage_limit, ApiKeyValidationError,
    MIN_USAGE_LIMIT,
};

#[cfg(test)]
pub use repository::mock;
