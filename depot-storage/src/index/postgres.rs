//! PostgreSQL artifact index adapter.
//!
//! One `artifact_records` table keyed `(project_id, commit_hash)`. The
//! schema is ensured at startup and the upsert is `ON CONFLICT DO
//! NOTHING`, so concurrent duplicate inserts are harmless.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use depot_core::{ArtifactRecord, CommitHash, IndexError, ProjectId, Timestamp};
use tokio_postgres::{NoTls, Row};

use super::ArtifactIndex;

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
    /// Connection timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "depot".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("DEPOT_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("DEPOT_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("DEPOT_DB_NAME").unwrap_or_else(|_| "depot".to_string()),
            user: std::env::var("DEPOT_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("DEPOT_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("DEPOT_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("DEPOT_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> Result<Pool, IndexError> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        cfg.create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| IndexError::Unavailable {
                reason: format!("failed to create pool: {e}"),
            })
    }
}

// ============================================================================
// POSTGRES ADAPTER
// ============================================================================

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS artifact_records (
    project_id        UUID        NOT NULL,
    commit_hash       TEXT        NOT NULL,
    project_name      TEXT        NOT NULL,
    working_tree_path TEXT        NOT NULL,
    bundle_path       TEXT        NOT NULL,
    created_at        TIMESTAMPTZ NOT NULL,
    PRIMARY KEY (project_id, commit_hash)
)";

const FIND_EXACT_SQL: &str = "SELECT project_id, commit_hash, project_name, working_tree_path, \
     bundle_path, created_at FROM artifact_records \
     WHERE project_id = $1 AND commit_hash = $2";

const FIND_ANY_SQL: &str = "SELECT project_id, commit_hash, project_name, working_tree_path, \
     bundle_path, created_at FROM artifact_records \
     WHERE project_id = $1 LIMIT 1";

const UPSERT_SQL: &str = "INSERT INTO artifact_records \
     (project_id, commit_hash, project_name, working_tree_path, bundle_path, created_at) \
     VALUES ($1, $2, $3, $4, $5, $6) \
     ON CONFLICT (project_id, commit_hash) DO NOTHING";

/// Index adapter backed by a deadpool-postgres pool.
#[derive(Clone)]
pub struct PostgresIndex {
    pool: Pool,
}

impl PostgresIndex {
    /// Connect and ensure the schema exists.
    pub async fn connect(config: &DbConfig) -> Result<Self, IndexError> {
        let pool = config.create_pool()?;
        let index = Self { pool };
        let conn = index.conn().await?;
        conn.batch_execute(SCHEMA)
            .await
            .map_err(|e| IndexError::Unavailable {
                reason: format!("failed to ensure schema: {e}"),
            })?;
        tracing::info!("artifact index schema ready");
        Ok(index)
    }

    async fn conn(&self) -> Result<deadpool_postgres::Object, IndexError> {
        self.pool.get().await.map_err(|e| IndexError::Unavailable {
            reason: format!("failed to acquire connection: {e}"),
        })
    }
}

#[async_trait]
impl ArtifactIndex for PostgresIndex {
    async fn find_exact(
        &self,
        project_id: ProjectId,
        commit: &CommitHash,
    ) -> Result<Option<ArtifactRecord>, IndexError> {
        let conn = self.conn().await?;
        let commit_str = commit.as_str();
        let row = conn
            .query_opt(FIND_EXACT_SQL, &[&project_id, &commit_str])
            .await
            .map_err(query_failed)?;
        row.map(row_to_record).transpose()
    }

    async fn find_any(&self, project_id: ProjectId) -> Result<Option<ArtifactRecord>, IndexError> {
        let conn = self.conn().await?;
        let row = conn
            .query_opt(FIND_ANY_SQL, &[&project_id])
            .await
            .map_err(query_failed)?;
        row.map(row_to_record).transpose()
    }

    async fn upsert(&self, record: &ArtifactRecord) -> Result<(), IndexError> {
        let conn = self.conn().await?;
        let commit_str = record.commit_hash.as_str();
        let working_tree = record.working_tree_path.to_string_lossy().into_owned();
        let bundle = record.bundle_path.to_string_lossy().into_owned();
        conn.execute(
            UPSERT_SQL,
            &[
                &record.project_id,
                &commit_str,
                &record.project_name,
                &working_tree,
                &bundle,
                &record.created_at,
            ],
        )
        .await
        .map_err(|e| IndexError::InsertFailed {
            project_id: record.project_id,
            commit: record.commit_hash.to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), IndexError> {
        let conn = self.conn().await?;
        conn.query_one("SELECT 1", &[])
            .await
            .map_err(query_failed)?;
        Ok(())
    }
}

fn query_failed(err: tokio_postgres::Error) -> IndexError {
    IndexError::QueryFailed {
        reason: err.to_string(),
    }
}

fn row_to_record(row: Row) -> Result<ArtifactRecord, IndexError> {
    let commit_str: String = row.get("commit_hash");
    let commit = CommitHash::new(commit_str).map_err(|e| IndexError::QueryFailed {
        reason: format!("malformed commit hash in index: {e}"),
    })?;
    let working_tree: String = row.get("working_tree_path");
    let bundle: String = row.get("bundle_path");
    let created_at: Timestamp = row.get("created_at");
    Ok(ArtifactRecord {
        project_id: row.get("project_id"),
        commit_hash: commit,
        project_name: row.get("project_name"),
        working_tree_path: PathBuf::from(working_tree),
        bundle_path: PathBuf::from(bundle),
        created_at,
    })
}
