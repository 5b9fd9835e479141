//! Per-endpoint rate limit configuration

use serde::{Deserialize, Serialize};

use crate::domain::api_key::QuotaCost;

/// Cost presets for the rate-limited endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointCost {
    /// Read-only, cheap requests
    Lightweight,
    /// Default cost
    Standard,
    /// Requests doing substantial work
    Heavy,
    /// Most expensive operations
    Premium,
}

impl EndpointCost {
    pub fn cost(&self) -> QuotaCost {
        let units = match self {
            Self::Lightweight => 0.5,
            Self::Standard => 1.0,
            Self::Heavy => 5.0,
            Self::Premium => 10.0,
        };

        // All presets are positive finite constants
        QuotaCost::new(units).unwrap_or_default()
    }
}

impl From<EndpointCost> for QuotaCost {
    fn from(preset: EndpointCost) -> Self {
        preset.cost()
    }
}

/// Configuration attached to a wrapped handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Endpoint label used in logs and metrics
    pub endpoint: String,
    /// Units charged per admitted request
    #[serde(default)]
    pub increment_by: QuotaCost,
}

impl RateLimitConfig {
    /// Create a configuration charging one unit per request
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            increment_by: QuotaCost::one(),
        }
    }

    /// Override the per-request cost
    pub fn with_increment_by(mut self, cost: impl Into<QuotaCost>) -> Self {
        self.increment_by = cost.into();
        self
    }
}
