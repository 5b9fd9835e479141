//! Domain layer - Core business logic and entities

pub mod admission;
pub mod api_key;
pub mod error;
pub mod summarizer;

pub use admission::{Admission, AdmissionError, EndpointCost, RateLimitConfig};
pub use api_key::{
    ApiKey, ApiKeyId, ApiKeyRepository, ApiKeyStatus, ApiKeyValidationError, OwnerId, QuotaCost,
    UsageIncrement,
};
pub use error::DomainError;
pub use summarizer::{GithubRepo, ReadmeFetcher, RepoSummarizer, RepoSummary};
