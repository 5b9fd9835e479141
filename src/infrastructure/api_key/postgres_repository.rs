//! PostgreSQL API key repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::api_key::{
    ApiKey, ApiKeyId, ApiKeyRepository, ApiKeyStatus, OwnerId, QuotaCost, UsageIncrement,
    DEFAULT_USAGE_LIMIT,
};
use crate::domain::DomainError;

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, key, status,
           COALESCE(usage, 0) AS usage,
           COALESCE(usage_limit, 1000) AS usage_limit,
           owner, created_at, updated_at
    FROM api_keys
"#;

/// PostgreSQL implementation of ApiKeyRepository
#[derive(Debug, Clone)]
pub struct PostgresApiKeyRepository {
    pool: PgPool,
}

impl PostgresApiKeyRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ApiKeyRepository for PostgresApiKeyRepository {
    async fn get(&self, id: &ApiKeyId) -> Result<Option<ApiKey>, DomainError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get API key: {}", e)))?;

        row.as_ref().map(row_to_api_key).transpose()
    }

    async fn get_active_by_key(&self, key: &str) -> Result<Option<ApiKey>, DomainError> {
        let row = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE key = $1 AND status = 'active'"
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to look up API key: {}", e)))?;

        row.as_ref().map(row_to_api_key).transpose()
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<ApiKey>, DomainError> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE owner = $1 ORDER BY created_at DESC"
        ))
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list API keys: {}", e)))?;

        rows.iter().map(row_to_api_key).collect()
    }

    async fn create(&self, api_key: ApiKey) -> Result<ApiKey, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO api_keys (id, name, key, status, usage, usage_limit, owner,
                                  created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(api_key.id().as_uuid())
        .bind(api_key.name())
        .bind(api_key.key())
        .bind(api_key.status().as_str())
        .bind(api_key.usage())
        .bind(api_key.limit())
        .bind(api_key.owner().as_str())
        .bind(api_key.created_at())
        .bind(api_key.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict(format!(
                    "API key with ID '{}' or the same secret already exists",
                    api_key.id()
                ))
            } else {
                DomainError::storage(format!("Failed to create API key: {}", e))
            }
        })?;

        Ok(api_key)
    }

    async fn update(&self, api_key: &ApiKey) -> Result<ApiKey, DomainError> {
        let row = sqlx::query(
            r#"
            UPDATE api_keys
            SET name = $2, status = $3, usage_limit = $4, updated_at = $5
            WHERE id = $1
            RETURNING id, name, key, status,
                      COALESCE(usage, 0) AS usage,
                      COALESCE(usage_limit, 1000) AS usage_limit,
                      owner, created_at, updated_at
            "#,
        )
        .bind(api_key.id().as_uuid())
        .bind(api_key.name())
        .bind(api_key.status().as_str())
        .bind(api_key.limit())
        .bind(api_key.updated_at())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update API key: {}", e)))?;

        match row {
            Some(row) => row_to_api_key(&row),
            None => Err(DomainError::not_found(format!(
                "API key '{}' not found",
                api_key.id()
            ))),
        }
    }

    async fn reset_usage(&self, id: &ApiKeyId) -> Result<ApiKey, DomainError> {
        let row = sqlx::query(
            r#"
            UPDATE api_keys
            SET usage = 0, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, key, status,
                      COALESCE(usage, 0) AS usage,
                      COALESCE(usage_limit, 1000) AS usage_limit,
                      owner, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to reset API key usage: {}", e)))?;

        match row {
            Some(row) => row_to_api_key(&row),
            None => Err(DomainError::not_found(format!("API key '{}' not found", id))),
        }
    }

    async fn delete(&self, id: &ApiKeyId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete API key: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn try_increment_usage(
        &self,
        key: &str,
        cost: QuotaCost,
    ) -> Result<UsageIncrement, DomainError> {
        // Zero rows returned means the ceiling, the status or the key itself
        // rejected the increment.
        let row = sqlx::query(
            r#"
            UPDATE api_keys
            SET usage = COALESCE(usage, 0) + $2, updated_at = NOW()
            WHERE key = $1
              AND status = 'active'
              AND COALESCE(usage, 0) + $2 <= COALESCE(usage_limit, 1000)
            RETURNING usage, COALESCE(usage_limit, 1000) AS usage_limit
            "#,
        )
        .bind(key)
        .bind(cost.units())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to increment API key usage: {}", e)))?;

        if let Some(row) = row {
            return Ok(UsageIncrement::Applied {
                usage: row.get("usage"),
                limit: row.get("usage_limit"),
            });
        }

        let current = sqlx::query(
            r#"
            SELECT COALESCE(usage, 0) AS usage, COALESCE(usage_limit, 1000) AS usage_limit
            FROM api_keys
            WHERE key = $1 AND status = 'active'
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to read API key usage: {}", e)))?;

        Ok(match current {
            Some(row) => UsageIncrement::Exhausted {
                usage: row.get("usage"),
                limit: row.get("usage_limit"),
            },
            None => UsageIncrement::NotAdmissible,
        })
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM api_keys")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count API keys: {}", e)))?;

        Ok(count as usize)
    }
}

fn row_to_api_key(row: &PgRow) -> Result<ApiKey, DomainError> {
    let id: Uuid = row.get("id");
    let name: String = row.get("name");
    let key: String = row.get("key");
    let status: String = row.get("status");
    let usage: Option<f64> = row.get("usage");
    let limit: Option<f64> = row.get("usage_limit");
    let owner: String = row.get("owner");
    let created_at: DateTime<Utc> = row.get("created_at");
    let updated_at: DateTime<Utc> = row.get("updated_at");

    let status: ApiKeyStatus = status
        .parse()
        .map_err(|e| DomainError::storage(format!("Invalid status in database: {}", e)))?;
    let owner = OwnerId::new(owner)
        .map_err(|e| DomainError::storage(format!("Invalid owner in database: {}", e)))?;

    Ok(ApiKey::new(name, key, owner)
        .with_id(ApiKeyId::from(id))
        .with_status(status)
        .with_usage(usage.unwrap_or(0.0))
        .with_limit(limit.unwrap_or(DEFAULT_USAGE_LIMIT))
        .with_timestamps(created_at, updated_at))
}
