use std::path::Path;

use async_trait::async_trait;
use rusqlite::OptionalExtension;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::domain::{LoadTestSummary, ProbeOutcome};
use crate::error::{AppError, AppResult, StoreError};

use super::{
    DEFAULT_OUTCOME_LIST_LIMIT, DEFAULT_SUMMARY_LIST_LIMIT, ResultStore, StoreLimits,
    resolve_limit,
};

const OUTCOMES_TABLE: &str = "probe_outcomes";
const SUMMARIES_TABLE: &str = "load_summaries";

/// SQLite-backed store with the same bounded, FIFO semantics as
/// [`super::MemoryStore`]. Records are kept as JSON next to an insertion
/// sequence; each insert and its eviction share one transaction.
pub struct SqliteStore {
    conn: Connection,
    limits: StoreLimits,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be opened or the schema cannot
    /// be created.
    pub async fn open(path: &Path, limits: StoreLimits) -> AppResult<Self> {
        let conn = Connection::open(path).await.map_err(|err| {
            AppError::store(StoreError::Open {
                path: path.to_path_buf(),
                source: err,
            })
        })?;
        Self::init(conn, limits).await
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error when the schema cannot be created.
    pub async fn open_in_memory(limits: StoreLimits) -> AppResult<Self> {
        let conn = Connection::open_in_memory().await.map_err(|err| {
            AppError::store(StoreError::Open {
                path: ":memory:".into(),
                source: err,
            })
        })?;
        Self::init(conn, limits).await
    }

    async fn init(conn: Connection, limits: StoreLimits) -> AppResult<Self> {
        conn.call(|conn| {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS probe_outcomes (
                    seq INTEGER PRIMARY KEY AUTOINCREMENT,
                    id TEXT NOT NULL,
                    body TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS load_summaries (
                    seq INTEGER PRIMARY KEY AUTOINCREMENT,
                    id TEXT NOT NULL,
                    body TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_load_summaries_id ON load_summaries(id);",
            )?;
            Ok(())
        })
        .await
        .map_err(|err| sqlite_error("create schema", err))?;
        Ok(Self { conn, limits })
    }

    async fn insert(
        &self,
        table: &'static str,
        id: String,
        body: String,
        capacity: usize,
    ) -> AppResult<()> {
        let capacity = clamp_i64(capacity);
        let evicted = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    &format!("INSERT INTO {} (id, body) VALUES (?1, ?2)", table),
                    rusqlite::params![id, body],
                )?;
                let evicted = tx.execute(
                    &format!(
                        "DELETE FROM {table} WHERE seq NOT IN
                         (SELECT seq FROM {table} ORDER BY seq DESC LIMIT ?1)"
                    ),
                    rusqlite::params![capacity],
                )?;
                tx.commit()?;
                Ok(evicted)
            })
            .await
            .map_err(|err| sqlite_error("insert", err))?;
        if evicted > 0 {
            debug!("Evicted {} row(s) from {}", evicted, table);
        }
        Ok(())
    }

    async fn recent_bodies(&self, table: &'static str, limit: usize) -> AppResult<Vec<String>> {
        let limit = clamp_i64(limit);
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT body FROM
                     (SELECT seq, body FROM {} ORDER BY seq DESC LIMIT ?1)
                     ORDER BY seq ASC",
                    table
                ))?;
                let rows = stmt.query_map(rusqlite::params![limit], |row| row.get::<_, String>(0))?;
                let mut bodies = Vec::new();
                for row in rows {
                    bodies.push(row?);
                }
                Ok(bodies)
            })
            .await
            .map_err(|err| sqlite_error("list", err))
    }
}

#[async_trait]
impl ResultStore for SqliteStore {
    async fn save_outcome(&self, outcome: ProbeOutcome) -> AppResult<()> {
        let body = encode(&outcome, "probe outcome")?;
        self.insert(
            OUTCOMES_TABLE,
            outcome.id,
            body,
            self.limits.outcome_capacity.get(),
        )
        .await
    }

    async fn save_summary(&self, summary: LoadTestSummary) -> AppResult<()> {
        let body = encode(&summary, "load test summary")?;
        self.insert(
            SUMMARIES_TABLE,
            summary.id,
            body,
            self.limits.summary_capacity.get(),
        )
        .await
    }

    async fn list_outcomes(&self, limit: usize) -> AppResult<Vec<ProbeOutcome>> {
        let bodies = self
            .recent_bodies(
                OUTCOMES_TABLE,
                resolve_limit(limit, DEFAULT_OUTCOME_LIST_LIMIT),
            )
            .await?;
        bodies
            .iter()
            .map(|body| decode(body, "probe outcome"))
            .collect()
    }

    async fn list_summaries(&self, limit: usize) -> AppResult<Vec<LoadTestSummary>> {
        let bodies = self
            .recent_bodies(
                SUMMARIES_TABLE,
                resolve_limit(limit, DEFAULT_SUMMARY_LIST_LIMIT),
            )
            .await?;
        bodies
            .iter()
            .map(|body| decode(body, "load test summary"))
            .collect()
    }

    async fn get_summary(&self, id: &str) -> AppResult<Option<LoadTestSummary>> {
        let id = id.to_owned();
        let body = self
            .conn
            .call(move |conn| {
                let body = conn
                    .query_row(
                        "SELECT body FROM load_summaries WHERE id = ?1 ORDER BY seq DESC LIMIT 1",
                        rusqlite::params![id],
                        |row| row.get::<_, String>(0),
                    )
                    .optional()?;
                Ok(body)
            })
            .await
            .map_err(|err| sqlite_error("lookup", err))?;
        body.map(|body| decode(&body, "load test summary"))
            .transpose()
    }
}

fn encode<T: Serialize>(value: &T, context: &'static str) -> AppResult<String> {
    serde_json::to_string(value)
        .map_err(|err| AppError::store(StoreError::Encode { context, source: err }))
}

fn decode<T: DeserializeOwned>(body: &str, context: &'static str) -> AppResult<T> {
    serde_json::from_str(body)
        .map_err(|err| AppError::store(StoreError::Decode { context, source: err }))
}

fn sqlite_error(context: &'static str, err: tokio_rusqlite::Error) -> AppError {
    AppError::store(StoreError::Sqlite {
        context,
        source: err,
    })
}

fn clamp_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
