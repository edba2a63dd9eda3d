use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use carvault_core::timestamp::{self, TimestampMode};
use carvault_core::TimestampError;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Error as SqlxError, Row, Sqlite, SqlitePool, Transaction};
use thiserror::Error;
use tracing::debug;

use crate::storage::{PersistedRow, RowTable, RowTransaction};

#[derive(Clone)]
pub struct SqliteRowTable {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
pub enum SqliteTableError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] SqlxError),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("timestamp error: {0}")]
    Timestamp(#[from] TimestampError),
}

impl SqliteRowTable {
    /// Opens (creating if needed) the database file at `path`.
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, SqliteTableError> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);
        let pool = SqlitePool::connect_with(options).await?;

        Self::run_migrations(&pool).await?;
        debug!(path = %path.as_ref().display(), "opened sqlite row table");

        Ok(Self { pool })
    }

    /// A private database that lives as long as this table and its clones.
    pub async fn in_memory() -> Result<Self, SqliteTableError> {
        // one connection, never recycled: each new connection would see an
        // empty database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
            .await?;

        Self::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteTableError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        Ok(())
    }

    fn decode_row(row: &SqliteRow) -> Result<PersistedRow, SqliteTableError> {
        let stamp: String = row.try_get("timestamp")?;

        Ok(PersistedRow {
            identity_ciphertext: row.try_get("vehicle_key")?,
            status_ciphertext: row.try_get("status")?,
            attributes_ciphertext: row.try_get("attributes")?,
            timestamp: timestamp::parse(&stamp, TimestampMode::Iso8601)?,
        })
    }
}

#[async_trait]
impl RowTable for SqliteRowTable {
    type Error = SqliteTableError;
    type Transaction = SqliteRowTransaction;

    async fn begin(&self) -> Result<Self::Transaction, Self::Error> {
        Ok(SqliteRowTransaction {
            tx: self.pool.begin().await?,
        })
    }

    async fn fetch_all(&self) -> Result<Vec<PersistedRow>, Self::Error> {
        let rows = sqlx::query(
            "SELECT vehicle_key, status, attributes, timestamp FROM vehicle_snapshots ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::decode_row).collect()
    }
}

/// An open sqlite transaction. Dropped without commit, sqlx rolls it back.
pub struct SqliteRowTransaction {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl RowTransaction for SqliteRowTransaction {
    type Error = SqliteTableError;

    async fn delete_all(&mut self) -> Result<u64, Self::Error> {
        let result = sqlx::query("DELETE FROM vehicle_snapshots")
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn upsert(&mut self, row: PersistedRow) -> Result<(), Self::Error> {
        let stamp = timestamp::format_lossless(row.timestamp)?;

        sqlx::query(
            r#"
            INSERT INTO vehicle_snapshots (vehicle_key, status, attributes, timestamp)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(vehicle_key) DO UPDATE SET
                status = excluded.status,
                attributes = excluded.attributes,
                timestamp = excluded.timestamp
            "#,
        )
        .bind(&row.identity_ciphertext)
        .bind(&row.status_ciphertext)
        .bind(&row.attributes_ciphertext)
        .bind(stamp)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn commit(self) -> Result<(), Self::Error> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), Self::Error> {
        self.tx.rollback().await?;
        Ok(())
    }
}
