use serde::Deserialize;

use crate::infrastructure::observability::MetricsConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub api_keys: ApiKeysConfig,
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Where API keys are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    /// Pool acquire timeout, which also bounds each admission store call
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: u64,
}

/// Shortest random part a generated key secret may have
pub const MIN_KEY_LENGTH: usize = 16;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiKeysConfig {
    pub key_prefix: String,
    pub key_length: usize,
    pub default_limit: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub model: String,
    pub github_raw_base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            max_connections: 10,
            connect_timeout_secs: 5,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_hours: 24,
        }
    }
}

impl Default for ApiKeysConfig {
    fn default() -> Self {
        Self {
            key_prefix: crate::infrastructure::api_key::DEFAULT_KEY_PREFIX.to_string(),
            key_length: crate::infrastructure::api_key::DEFAULT_KEY_LENGTH,
            default_limit: crate::domain::api_key::DEFAULT_USAGE_LIMIT,
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: crate::infrastructure::llm::DEFAULT_OPENAI_BASE_URL.to_string(),
            model: crate::infrastructure::llm::DEFAULT_SUMMARY_MODEL.to_string(),
            github_raw_base_url: crate::infrastructure::github::DEFAULT_GITHUB_RAW_BASE_URL
                .to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;

        Ok(config.with_fallbacks(
            std::env::var("OPENAI_API_KEY").ok(),
            std::env::var("DATABASE_URL").ok(),
        ))
    }

    /// Fill unset secrets from the conventional environment variables
    pub fn with_fallbacks(
        mut self,
        openai_api_key: Option<String>,
        database_url: Option<String>,
    ) -> Self {
        if self.summarizer.openai_api_key.is_none() {
            self.summarizer.openai_api_key = openai_api_key.filter(|k| !k.is_empty());
        }

        if self.storage.database_url.is_none() {
            self.storage.database_url = database_url.filter(|u| !u.is_empty());
        }

        self
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.storage.backend == StorageBackend::Postgres && self.storage.database_url.is_none() {
            return Err(config::ConfigError::Message(
                "storage.database_url (or DATABASE_URL) is required for the postgres backend"
                    .to_string(),
            ));
        }

        if self.api_keys.key_length < MIN_KEY_LENGTH {
            return Err(config::ConfigError::Message(format!(
                "api_keys.key_length must be at least {}",
                MIN_KEY_LENGTH
            )));
        }

        if crate::domain::api_key::validate_usage_limit(self.api_keys.default_limit).is_err() {
            return Err(config::ConfigError::Message(
                "api_keys.default_limit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.api_keys.key_prefix, "sk-");
        assert_eq!(config.api_keys.key_length, 32);
        assert_eq!(config.api_keys.default_limit, 1000.0);
        assert_eq!(config.summarizer.model, "gpt-4o");
        assert!(config.metrics.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file() {
        let config = from_toml(
            r#"
            [server]
            port = 9000

            [storage]
            backend = "postgres"
            database_url = "postgres://localhost/keys"

            [logging]
            format = "json"
            "#,
        );

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(config.storage.max_connections, 10);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_postgres_requires_url() {
        let config = from_toml(
            r#"
            [storage]
            backend = "postgres"
            "#,
        );

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_fallbacks_do_not_override() {
        let mut config = AppConfig::default();
        config.summarizer.openai_api_key = Some("from-file".to_string());

        let config = config.with_fallbacks(
            Some("from-env".to_string()),
            Some("postgres://env/db".to_string()),
        );

        assert_eq!(config.summarizer.openai_api_key.as_deref(), Some("from-file"));
        assert_eq!(config.storage.database_url.as_deref(), Some("postgres://env/db"));
    }

    #[test]
    fn test_empty_fallbacks_ignored() {
        let config = AppConfig::default().with_fallbacks(Some(String::new()), None);
        assert!(config.summarizer.openai_api_key.is_none());
    }

    #[test]
    fn test_short_key_length_rejected() {
        let mut config = AppConfig::default();
        config.api_keys.key_length = 0;
        assert!(config.validate().is_err());

        config.api_keys.key_length = MIN_KEY_LENGTH - 1;
        assert!(config.validate().is_err());

        config.api_keys.key_length = MIN_KEY_LENGTH;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_default_limit() {
        let mut config = AppConfig::default();
        config.api_keys.default_limit = 0.0;
        assert!(config.validate().is_err());
    }
}
