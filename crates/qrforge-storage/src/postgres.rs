use async_trait::async_trait;
use jiff::Timestamp;
use qrforge_core::repository::{CodeRecord, CodeRepository, Result};
use qrforge_core::{ShortCode, StorageError};
use sqlx::{PgPool, Row};

/// Postgres implementation of the repository contract.
///
/// The `qr_codes` table carries a unique index on `shortcode`; that index is
/// the final arbiter of uniqueness, and a violated insert surfaces as
/// [`StorageError::Conflict`] so the caller can retry allocation once
/// instead of reporting a failure to the end user.
#[derive(Debug, Clone)]
pub struct PostgresCodeStore {
    pool: PgPool,
}

impl PostgresCodeStore {
    /// Creates a store from an existing Postgres connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a store by opening a new Postgres connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn parse_created_at(seconds: i64) -> Result<Timestamp> {
    Timestamp::from_second(seconds).map_err(|e| {
        StorageError::InvalidData(format!("invalid created_at timestamp '{}': {e}", seconds))
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl CodeRepository for PostgresCodeStore {
    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        let exists = sqlx::query(
            r#"
            SELECT 1
            FROM qr_codes
            WHERE shortcode = $1
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .is_some();

        Ok(exists)
    }

    async fn insert(&self, code: &ShortCode, record: CodeRecord) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO qr_codes (shortcode, qr_id, created_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(code.as_str())
        .bind(&record.qr_id)
        .bind(record.created_at.as_second())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(StorageError::Conflict(code.to_string())),
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn delete(&self, code: &ShortCode) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM qr_codes
            WHERE shortcode = $1
            "#,
        )
        .bind(code.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

impl PostgresCodeStore {
    /// Fetches the full record for a short code; used by admin tooling, not
    /// by the allocation path.
    pub async fn get(&self, code: &ShortCode) -> Result<Option<CodeRecord>> {
        let row = sqlx::query(
            r#"
            SELECT qr_id, created_at
            FROM qr_codes
            WHERE shortcode = $1
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let qr_id: String = row.try_get("qr_id").map_err(map_sqlx_error)?;
        let created_at_raw: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
        let created_at = parse_created_at(created_at_raw)?;

        Ok(Some(CodeRecord { qr_id, created_at }))
    }
}
