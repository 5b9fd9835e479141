//! Quota arithmetic types shared by the admission path and key management

use serde::{Deserialize, Serialize, Serializer};

use super::validation::{validate_quota_cost, ApiKeyValidationError};

/// Limit assigned to keys that do not specify one
pub const DEFAULT_USAGE_LIMIT: f64 = 1000.0;

/// Number of quota units charged for one request
///
/// Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct QuotaCost(f64);

impl QuotaCost {
    /// Create a cost after validation
    pub fn new(units: f64) -> Result<Self, ApiKeyValidationError> {
        validate_quota_cost(units)?;
        Ok(Self(units))
    }

    /// One unit, the cost of a standard request
    pub const fn one() -> Self {
        Self(1.0)
    }

    pub fn units(&self) -> f64 {
        self.0
    }
}

impl Default for QuotaCost {
    fn default() -> Self {
        Self::one()
    }
}

impl TryFrom<f64> for QuotaCost {
    type Error = ApiKeyValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<QuotaCost> for f64 {
    fn from(cost: QuotaCost) -> Self {
        cost.0
    }
}

impl std::fmt::Display for QuotaCost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether charging `cost` on top of `usage` stays within `limit`
pub fn fits_within_limit(usage: f64, cost: QuotaCost, limit: f64) -> bool {
    usage + cost.units() <= limit
}

/// Convert a quota number to JSON, emitting whole numbers as integers
pub fn quota_value(units: f64) -> serde_json::Value {
    if units.fract() == 0.0 && units >= 0.0 && units <= u64::MAX as f64 {
        serde_json::Value::from(units as u64)
    } else {
        serde_json::Value::from(units)
    }
}

/// Serde helper for quota fields (`#[serde(serialize_with = "...")]`)
pub fn serialize_quota<S>(units: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    quota_value(*units).serialize(serializer)
}

/// Serde helper for optional quota fields
pub fn serialize_optional_quota<S>(units: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match units {
        Some(units) => quota_value(*units).serialize(serializer),
        None => serializer.serialize_none(),
    }
}

pub(crate) fn default_usage_limit() -> f64 {
    DEFAULT_USAGE_LIMIT
}
