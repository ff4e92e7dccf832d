//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling using deadpool-postgres, and the
//! PostgreSQL-backed `CandidateStore`.
//!
//! Each staged write is a single INSERT or UPDATE statement, so a commit is
//! atomic without an explicit transaction. Email uniqueness is enforced by
//! the `candidates_email_key` constraint created in [`PgCandidateStore::migrate`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolError, RecyclingMethod, Runtime};
use talent_core::{CandidateId, CandidateProfile, StorageError, TalentResult};
use talent_storage::{CandidateStore, PendingWrite};
use tokio_postgres::{error::SqlState, NoTls, Row};
use uuid::Uuid;

use crate::constants::{DEFAULT_DB_POOL_SIZE, DEFAULT_DB_TIMEOUT_SECS};
use crate::error::{ApiError, ApiResult};
use crate::telemetry::METRICS;

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Connection wait timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "talent".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: DEFAULT_DB_POOL_SIZE,
            timeout: Duration::from_secs(DEFAULT_DB_TIMEOUT_SECS),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("TALENT_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("TALENT_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("TALENT_DB_NAME").unwrap_or_else(|_| "talent".to_string()),
            user: std::env::var("TALENT_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("TALENT_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("TALENT_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_DB_POOL_SIZE),
            timeout: Duration::from_secs(
                std::env::var("TALENT_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DB_TIMEOUT_SECS),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_cfg = deadpool_postgres::PoolConfig::new(self.max_size);
        pool_cfg.timeouts.wait = Some(self.timeout);
        cfg.pool = Some(pool_cfg);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

const CREATE_CANDIDATES_TABLE: &str = "
CREATE TABLE IF NOT EXISTS candidates (
    id                 UUID PRIMARY KEY,
    first_name         TEXT NOT NULL,
    last_name          TEXT NOT NULL,
    phone_number       TEXT,
    email              TEXT NOT NULL,
    call_time_interval TEXT,
    linked_in_url      TEXT,
    git_hub_url        TEXT,
    comment            TEXT NOT NULL,
    created_at         TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at         TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT candidates_email_key UNIQUE (email)
)";

const CANDIDATE_COLUMNS: &str = "id, first_name, last_name, phone_number, email, \
     call_time_interval, linked_in_url, git_hub_url, comment";

// ============================================================================
// CANDIDATE STORE
// ============================================================================

/// PostgreSQL candidate store.
#[derive(Clone)]
pub struct PgCandidateStore {
    pool: Pool,
}

impl PgCandidateStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new store from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    /// Create the `candidates` table if it does not exist.
    pub async fn migrate(&self) -> ApiResult<()> {
        let conn = self.pool.get().await?;
        conn.batch_execute(CREATE_CANDIDATES_TABLE).await?;
        tracing::info!("Candidate schema is up to date");
        Ok(())
    }

    async fn get_conn(&self) -> Result<deadpool_postgres::Object, StorageError> {
        self.pool.get().await.map_err(pool_error)
    }

    async fn insert(&self, profile: &CandidateProfile) -> Result<Row, StorageError> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "INSERT INTO candidates ({CANDIDATE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {CANDIDATE_COLUMNS}"
        );
        let id = profile.id.as_uuid();
        conn.query_one(
            sql.as_str(),
            &[
                &id,
                &profile.first_name,
                &profile.last_name,
                &profile.phone_number,
                &profile.email,
                &profile.call_time_interval,
                &profile.linked_in_url,
                &profile.git_hub_url,
                &profile.comment,
            ],
        )
        .await
        .map_err(|e| query_error(e, &profile.email))
    }

    async fn update(&self, profile: &CandidateProfile) -> Result<Option<Row>, StorageError> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "UPDATE candidates SET \
                first_name = $2, last_name = $3, phone_number = $4, email = $5, \
                call_time_interval = $6, linked_in_url = $7, git_hub_url = $8, \
                comment = $9, updated_at = now() \
             WHERE id = $1 \
             RETURNING {CANDIDATE_COLUMNS}"
        );
        let id = profile.id.as_uuid();
        conn.query_opt(
            sql.as_str(),
            &[
                &id,
                &profile.first_name,
                &profile.last_name,
                &profile.phone_number,
                &profile.email,
                &profile.call_time_interval,
                &profile.linked_in_url,
                &profile.git_hub_url,
                &profile.comment,
            ],
        )
        .await
        .map_err(|e| query_error(e, &profile.email))
    }
}

fn record(operation: &str, success: bool, started: Instant) {
    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_store_operation(operation, success, started.elapsed().as_secs_f64());
    }
}

fn row_to_profile(row: &Row) -> Result<CandidateProfile, StorageError> {
    let parse = |e: tokio_postgres::Error| StorageError::Query {
        reason: format!("Failed to decode candidate row: {}", e),
    };
    let id: Uuid = row.try_get("id").map_err(parse)?;
    Ok(CandidateProfile {
        id: CandidateId::new(id),
        first_name: row.try_get("first_name").map_err(parse)?,
        last_name: row.try_get("last_name").map_err(parse)?,
        phone_number: row.try_get("phone_number").map_err(parse)?,
        email: row.try_get("email").map_err(parse)?,
        call_time_interval: row.try_get("call_time_interval").map_err(parse)?,
        linked_in_url: row.try_get("linked_in_url").map_err(parse)?,
        git_hub_url: row.try_get("git_hub_url").map_err(parse)?,
        comment: row.try_get("comment").map_err(parse)?,
    })
}

fn pool_error(err: PoolError) -> StorageError {
    tracing::error!("Connection pool error: {:?}", err);
    StorageError::Unavailable {
        reason: match err {
            PoolError::Timeout(_) => "connection pool exhausted".to_string(),
            PoolError::Closed => "connection pool is closed".to_string(),
            other => other.to_string(),
        },
    }
}

fn query_error(err: tokio_postgres::Error, email: &str) -> StorageError {
    if let Some(db_error) = err.as_db_error() {
        if db_error.code() == &SqlState::UNIQUE_VIOLATION {
            return StorageError::UniqueViolation {
                constraint: db_error
                    .constraint()
                    .unwrap_or("candidates_email_key")
                    .to_string(),
                value: email.to_string(),
            };
        }
    }
    if err.is_closed() {
        return StorageError::Unavailable {
            reason: err.to_string(),
        };
    }
    tracing::error!("Database error: {:?}", err);
    StorageError::Query {
        reason: err.to_string(),
    }
}

#[async_trait]
impl CandidateStore for PgCandidateStore {
    async fn find_by_email(&self, email: &str) -> TalentResult<Option<CandidateProfile>> {
        let started = Instant::now();
        let result: Result<Option<CandidateProfile>, StorageError> = async {
            let conn = self.get_conn().await?;
            let sql = format!(
                "SELECT {CANDIDATE_COLUMNS} FROM candidates \
                 WHERE email = $1 ORDER BY created_at, id LIMIT 1"
            );
            let row = conn
                .query_opt(sql.as_str(), &[&email])
                .await
                .map_err(|e| query_error(e, email))?;
            row.as_ref().map(row_to_profile).transpose()
        }
        .await;

        record("find_by_email", result.is_ok(), started);
        Ok(result?)
    }

    async fn commit(&self, write: PendingWrite) -> TalentResult<CandidateProfile> {
        let started = Instant::now();
        let result = match write {
            PendingWrite::Insert(payload) => {
                let profile = CandidateProfile::from_payload(CandidateId::generate(), payload);
                self.insert(&profile)
                    .await
                    .and_then(|row| row_to_profile(&row))
            }
            PendingWrite::Update(profile) => match self.update(&profile).await {
                Ok(Some(row)) => row_to_profile(&row),
                Ok(None) => Err(StorageError::NotFound { id: profile.id }),
                Err(e) => Err(e),
            },
        };

        record("commit", result.is_ok(), started);
        Ok(result?)
    }

    async fn count(&self) -> TalentResult<u64> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_one("SELECT COUNT(*) FROM candidates", &[])
            .await
            .map_err(|e| query_error(e, ""))?;
        let count: i64 = row.try_get(0).map_err(|e| StorageError::Query {
            reason: e.to_string(),
        })?;
        Ok(count.max(0) as u64)
    }

    async fn health_check(&self) -> TalentResult<bool> {
        let conn = self.get_conn().await?;
        conn.query_one("SELECT 1", &[])
            .await
            .map_err(|e| query_error(e, ""))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_db_config() {
        let config = DbConfig::default();
        assert_eq!(config.port, 5432);
        assert_eq!(config.dbname, "talent");
        assert_eq!(config.max_size, DEFAULT_DB_POOL_SIZE);
    }

    #[test]
    fn test_schema_declares_unique_email() {
        assert!(CREATE_CANDIDATES_TABLE.contains("CONSTRAINT candidates_email_key UNIQUE (email)"));
    }

    #[test]
    fn test_pool_errors_map_to_unavailable() {
        let err = pool_error(PoolError::Closed);
        assert!(matches!(err, StorageError::Unavailable { .. }));
    }
}
