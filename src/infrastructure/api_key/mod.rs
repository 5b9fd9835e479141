//! API Key infrastructure implementations
//!
//! Key generation, the in-memory and PostgreSQL stores, owner-scoped
//! management and the admission controller.

mod admission;
mod generator;
mod postgres_repository;
mod repository;
mod service;

pub use admission::AdmissionController;
pub use generator::{ApiKeyGenerator, DEFAULT_KEY_LENGTH, DEFAULT_KEY_PREFIX};
pub use postgres_repository::PostgresApiKeyRepository;
pub use repository::InMemoryApiKeyRepository;
pub use service::{ApiKeyService, CreateApiKey, UpdateApiKey};
