//! SQLite-backed document store.
//!
//! One row per physical path in the `documents` table. Values are stored as
//! JSON text and replaced wholesale on every write.

use std::{
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

use {
    async_trait::async_trait,
    serde_json::Value,
    sqlx::{
        SqlitePool,
        sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    },
    tracing::debug,
};

use crate::{
    Error, Result,
    store::{Document, DocumentStore, is_direct_child},
};

/// Run the brain's schema migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

fn decode(path: &str, raw: &str) -> Result<Value> {
    serde_json::from_str(raw).map_err(|e| Error::malformed(path, e))
}

pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    /// Wrap an existing pool. The caller is responsible for migrations.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the database at `url` and migrate it.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        run_migrations(&pool).await?;
        debug!(url, "brain database ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn read(&self, path: &str) -> Result<Option<Document>> {
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT value, version FROM documents WHERE path = ?")
                .bind(path)
                .fetch_optional(&self.pool)
                .await?;
        row.map(|(raw, version)| -> Result<Document> {
            Ok(Document {
                value: decode(path, &raw)?,
                version: version as u64,
            })
        })
        .transpose()
    }

    async fn write(&self, path: &str, value: Value) -> Result<u64> {
        let raw = serde_json::to_string(&value)?;
        let version: i64 = sqlx::query_scalar(
            r#"INSERT INTO documents (path, value, version, updated_at)
               VALUES (?, ?, 1, ?)
               ON CONFLICT(path) DO UPDATE SET
                 value = excluded.value,
                 version = documents.version + 1,
                 updated_at = excluded.updated_at
               RETURNING version"#,
        )
        .bind(path)
        .bind(raw)
        .bind(now_ms())
        .fetch_one(&self.pool)
        .await?;
        Ok(version as u64)
    }

    async fn write_if(
        &self,
        path: &str,
        value: Value,
        expected: Option<u64>,
    ) -> Result<Option<u64>> {
        let raw = serde_json::to_string(&value)?;
        match expected {
            None => {
                let result = sqlx::query(
                    r#"INSERT INTO documents (path, value, version, updated_at)
                       VALUES (?, ?, 1, ?)
                       ON CONFLICT(path) DO NOTHING"#,
                )
                .bind(path)
                .bind(raw)
                .bind(now_ms())
                .execute(&self.pool)
                .await?;
                Ok((result.rows_affected() == 1).then_some(1))
            },
            Some(version) => {
                let result = sqlx::query(
                    "UPDATE documents SET value = ?, version = version + 1, updated_at = ? \
                     WHERE path = ? AND version = ?",
                )
                .bind(raw)
                .bind(now_ms())
                .bind(path)
                .bind(version as i64)
                .execute(&self.pool)
                .await?;
                Ok((result.rows_affected() == 1).then_some(version + 1))
            },
        }
    }

    async fn children(&self, path: &str) -> Result<Vec<Value>> {
        // '0' sorts right after '/', so [path/, path0) covers every descendant.
        let lower = format!("{path}/");
        let upper = format!("{path}0");
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT path, value FROM documents WHERE path >= ? AND path < ? ORDER BY path",
        )
        .bind(lower)
        .bind(upper)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .filter(|(child, _)| is_direct_child(path, child))
            .map(|(child, raw)| decode(&child, &raw))
            .collect()
    }

    async fn delete(&self, path: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE path = ?")
            .bind(path)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
