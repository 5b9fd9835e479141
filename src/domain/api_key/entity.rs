//! API Key entity and related types

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::quota::{default_usage_limit, serialize_quota, QuotaCost, DEFAULT_USAGE_LIMIT};
use super::validation::ApiKeyValidationError;

/// API Key identifier, assigned by the store on creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKeyId(Uuid);

impl ApiKeyId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier from its string form
    pub fn parse(id: &str) -> Result<Self, ApiKeyValidationError> {
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| ApiKeyValidationError::InvalidId(id.to_string()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ApiKeyId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ApiKeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the authenticated user owning a key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Result<Self, ApiKeyValidationError> {
        let id = id.into();

        if id.trim().is_empty() {
            return Err(ApiKeyValidationError::EmptyOwner);
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OwnerId {
    type Error = ApiKeyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OwnerId> for String {
    fn from(id: OwnerId) -> Self {
        id.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApiKeyStatus {
    /// Key may be admitted
    #[default]
    Active,
    /// Key is disabled by its owner
    Inactive,
}

impl ApiKeyStatus {
    /// Check if the key is usable
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl FromStr for ApiKeyStatus {
    type Err = ApiKeyValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(ApiKeyValidationError::InvalidStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for ApiKeyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// API Key entity
///
/// `usage` and `limit` default to 0 and 1000 when absent from stored data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    id: ApiKeyId,
    name: String,
    /// The secret presented in `x-api-key`
    key: String,
    status: ApiKeyStatus,
    #[serde(default, serialize_with = "serialize_quota")]
    usage: f64,
    #[serde(default = "default_usage_limit", serialize_with = "serialize_quota")]
    limit: f64,
    owner: OwnerId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ApiKey {
    /// Create a new active API key with zero usage and the default limit
    pub fn new(name: impl Into<String>, key: impl Into<String>, owner: OwnerId) -> Self {
        let now = Utc::now();

        Self {
            id: ApiKeyId::generate(),
            name: name.into(),
            key: key.into(),
            status: ApiKeyStatus::Active,
            usage: 0.0,
            limit: DEFAULT_USAGE_LIMIT,
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the identifier (used when restoring from storage)
    pub fn with_id(mut self, id: ApiKeyId) -> Self {
        self.id = id;
        self
    }

    /// Set status
    pub fn with_status(mut self, status: ApiKeyStatus) -> Self {
        self.status = status;
        self
    }

    /// Set usage
    pub fn with_usage(mut self, usage: f64) -> Self {
        self.usage = usage;
        self
    }

    /// Set limit
    pub fn with_limit(mut self, limit: f64) -> Self {
        self.limit = limit;
        self
    }

    /// Restore timestamps
    pub fn with_timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    // Getters

    pub fn id(&self) -> &ApiKeyId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// First characters of the secret, safe for logs
    pub fn key_prefix(&self) -> String {
        self.key.chars().take(8).collect()
    }

    pub fn status(&self) -> ApiKeyStatus {
        self.status
    }

    pub fn usage(&self) -> f64 {
        self.usage
    }

    pub fn limit(&self) -> f64 {
        self.limit
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Status checks

    pub fn is_active(&self) -> bool {
        self.status.is_usable()
    }

    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        &self.owner == owner
    }

    /// Units left before the limit is reached
    pub fn remaining(&self) -> f64 {
        (self.limit - self.usage).max(0.0)
    }

    /// Whether a request of the given cost would be admitted right now
    pub fn can_admit(&self, cost: QuotaCost) -> bool {
        self.is_active() && super::quota::fits_within_limit(self.usage, cost, self.limit)
    }

    // Mutators

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn set_status(&mut self, status: ApiKeyStatus) {
        self.status = status;
        self.touch();
    }

    pub fn set_limit(&mut self, limit: f64) {
        self.limit = limit;
        self.touch();
    }

    /// Owner-initiated reset of the usage counter
    pub fn reset_usage(&mut self) {
        self.usage = 0.0;
        self.touch();
    }

    /// Add `cost` to the usage counter
    pub fn charge(&mut self, cost: QuotaCost) {
        self.usage += cost.units();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_api_key() -> ApiKey {
        ApiKey::new("Test Key", "sk-abc", OwnerId::new("user@example.com").unwrap())
    }

    #[test]
    fn test_api_key_id_parse() {
        let id = ApiKeyId::generate();
        let parsed = ApiKeyId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);

        assert!(ApiKeyId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn test_owner_id_invalid() {
        assert!(OwnerId::new("").is_err());
        assert!(OwnerId::new("  ").is_err());
        assert!(OwnerId::new("user-1").is_ok());
    }

    #[test]
    fn test_api_key_status() {
        assert!(ApiKeyStatus::Active.is_usable());
        assert!(!ApiKeyStatus::Inactive.is_usable());
        assert_eq!("inactive".parse::<ApiKeyStatus>().unwrap(), ApiKeyStatus::Inactive);
        assert!("revoked".parse::<ApiKeyStatus>().is_err());
    }

    #[test]
    fn test_api_key_creation_defaults() {
        let key = create_test_api_key();

        assert_eq!(key.name(), "Test Key");
        assert_eq!(key.status(), ApiKeyStatus::Active);
        assert_eq!(key.usage(), 0.0);
        assert_eq!(key.limit(), 1000.0);
        assert!(key.is_active());
    }

    #[test]
    fn test_can_admit() {
        let key = create_test_api_key().with_usage(999.0);
        assert!(key.can_admit(QuotaCost::one()));
        assert!(!key.can_admit(QuotaCost::new(2.0).unwrap()));

        let inactive = create_test_api_key().with_status(ApiKeyStatus::Inactive);
        assert!(!inactive.can_admit(QuotaCost::one()));
    }

    #[test]
    fn test_charge_and_reset() {
        let mut key = create_test_api_key();

        key.charge(QuotaCost::new(0.5).unwrap());
        key.charge(QuotaCost::one());
        assert_eq!(key.usage(), 1.5);
        assert_eq!(key.remaining(), 998.5);

        key.reset_usage();
        assert_eq!(key.usage(), 0.0);
    }

    #[test]
    fn test_deserialize_applies_quota_defaults() {
        let json = serde_json::json!({
            "id": "2f1c7a52-5a3f-4a51-9d0c-7d6f7f4f4a10",
            "name": "legacy",
            "key": "sk-legacy",
            "status": "active",
            "owner": "user-1",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        });

        let key: ApiKey = serde_json::from_value(json).unwrap();
        assert_eq!(key.usage(), 0.0);
        assert_eq!(key.limit(), 1000.0);
    }

    #[test]
    fn test_serialize_whole_quota_as_integers() {
        let key = create_test_api_key().with_usage(3.0);
        let json = serde_json::to_value(&key).unwrap();

        assert_eq!(json["usage"], serde_json::json!(3));
        assert_eq!(json["limit"], serde_json::json!(1000));
    }

    #[test]
    fn test_key_prefix() {
        let key = ApiKey::new("k", "sk-abcdefghijkl", OwnerId::new("u").unwrap());
        assert_eq!(key.key_prefix(), "sk-abcde");
    }
}
