//! Repo Summarizer API
//!
//! Summarizes GitHub repositories from their README, gated by per-key quotas:
//! - API keys with a usage counter and a limit, managed by their owners
//! - Atomic admission control in front of every rate-limited endpoint
//! - In-memory or PostgreSQL credential store

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::AppState;
use config::{StorageBackend, SummarizerConfig};
use domain::{ApiKeyRepository, RepoSummarizer};
use infrastructure::{
    api_key::{ApiKeyGenerator, ApiKeyService, InMemoryApiKeyRepository, PostgresApiKeyRepository},
    auth::{JwtConfig, JwtService},
    github::GithubReadmeFetcher,
    http_client::HttpClient,
    llm::{OpenAiSummarizer, UnconfiguredSummarizer},
    storage::{connect_pool, PostgresConfig},
};
use tracing::{info, warn};

/// Create the application state from the default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    config.validate()?;

    info!("Storage backend: {:?}", config.storage.backend);

    match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory credential store");
            build_state(config, Arc::new(InMemoryApiKeyRepository::new()))
        }
        StorageBackend::Postgres => {
            let pool = connect_pool(&postgres_config(config)?).await?;
            info!("PostgreSQL connection established");
            build_state(config, Arc::new(PostgresApiKeyRepository::new(pool)))
        }
    }
}

/// PostgreSQL pool settings from the storage section
pub fn postgres_config(config: &AppConfig) -> anyhow::Result<PostgresConfig> {
    let url = config
        .storage
        .database_url
        .clone()
        .ok_or_else(|| anyhow::anyhow!("storage.database_url (or DATABASE_URL) is required"))?;

    Ok(PostgresConfig::new(url)
        .with_max_connections(config.storage.max_connections)
        .with_connect_timeout(config.storage.connect_timeout_secs))
}

fn build_state<R: ApiKeyRepository + 'static>(
    config: &AppConfig,
    repository: Arc<R>,
) -> anyhow::Result<AppState> {
    let generator = ApiKeyGenerator::new(&config.api_keys.key_prefix)
        .with_length(config.api_keys.key_length);
    let service = ApiKeyService::new(repository.clone())
        .with_generator(generator)
        .with_default_limit(config.api_keys.default_limit);

    let http_client =
        HttpClient::with_timeout(Duration::from_secs(config.summarizer.request_timeout_secs))?;

    let readme_fetcher = GithubReadmeFetcher::with_base_url(
        http_client.clone(),
        &config.summarizer.github_raw_base_url,
    );
    let summarizer = create_summarizer(&config.summarizer, http_client);

    let jwt_service = JwtService::new(JwtConfig::new(
        &config.auth.jwt_secret,
        config.auth.jwt_expiration_hours,
    ));

    Ok(AppState::with_repository(
        repository,
        service,
        Arc::new(readme_fetcher),
        summarizer,
        Arc::new(jwt_service),
    ))
}

fn create_summarizer(config: &SummarizerConfig, client: HttpClient) -> Arc<dyn RepoSummarizer> {
    match &config.openai_api_key {
        Some(api_key) => {
            info!(model = %config.model, "OpenAI summarizer configured");
            Arc::new(
                OpenAiSummarizer::with_base_url(client, api_key, &config.openai_base_url)
                    .with_model(&config.model),
            )
        }
        None => {
            warn!("OPENAI_API_KEY not set; the summarizer endpoint will return errors");
            Arc::new(UnconfiguredSummarizer)
        }
    }
}
