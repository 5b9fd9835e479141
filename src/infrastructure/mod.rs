//! Infrastructure layer - External service implementations

pub mod api_key;
pub mod auth;
pub mod github;
pub mod http_client;
pub mod llm;
pub mod logging;
pub mod observability;
pub mod storage;
