//! Admission results

use serde::Serialize;
use thiserror::Error;

use crate::domain::api_key::{serialize_quota, ApiKeyId};

/// A request that passed admission and has been charged
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Admission {
    pub key_id: ApiKeyId,
    /// Usage after this request's increment
    #[serde(serialize_with = "serialize_quota")]
    pub usage: f64,
    #[serde(serialize_with = "serialize_quota")]
    pub limit: f64,
}

impl Admission {
    pub fn remaining(&self) -> f64 {
        (self.limit - self.usage).max(0.0)
    }
}

/// Reasons a request was not admitted
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AdmissionError {
    #[error("Invalid or inactive API key")]
    InvalidOrInactiveKey,

    #[error("Rate limit exceeded")]
    RateLimitExceeded { usage: f64, limit: f64 },

    /// The conditional increment could not be written
    #[error("Failed to update usage tracking")]
    UsageUpdateFailed,

    /// The key lookup itself failed
    #[error("Rate limiting check failed")]
    CheckFailed,
}

impl AdmissionError {
    /// Label used for the `outcome` metric dimension
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::InvalidOrInactiveKey => "invalid_key",
            Self::RateLimitExceeded { .. } => "rate_limited",
            Self::UsageUpdateFailed => "update_failed",
            Self::CheckFailed => "check_failed",
        }
    }

    /// Current usage and limit, when the failure carries them
    pub fn quota(&self) -> Option<(f64, f64)> {
        match self {
            Self::RateLimitExceeded { usage, limit } => Some((*usage, *limit)),
            _ => None,
        }
    }
}
