//! Application configuration

mod app_config;

pub use app_config::{
    ApiKeysConfig, AppConfig, AuthConfig, LogFormat, LoggingConfig, ServerConfig,
    StorageBackend, StorageConfig, SummarizerConfig,
};
