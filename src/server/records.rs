//! Athlete rows and the config singleton.
//!
//! Athletes are stored as one JSON blob per row; the schema of the record
//! lives in the shared models, not in SQL columns. The config table holds a
//! single keyed row.

use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;

use crate::models::{merge_record_patch, AppConfig, Atleta};

const CONFIG_ROW_KEY: &str = "app";

#[derive(Debug)]
pub enum RecordError {
    Database(sqlx::Error),
    Serialize(serde_json::Error),
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::Database(e) => write!(f, "database error: {}", e),
            RecordError::Serialize(e) => write!(f, "record serialization error: {}", e),
        }
    }
}

impl std::error::Error for RecordError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecordError::Database(e) => Some(e),
            RecordError::Serialize(e) => Some(e),
        }
    }
}

impl From<sqlx::Error> for RecordError {
    fn from(e: sqlx::Error) -> Self {
        RecordError::Database(e)
    }
}

impl From<serde_json::Error> for RecordError {
    fn from(e: serde_json::Error) -> Self {
        RecordError::Serialize(e)
    }
}

#[derive(Debug, Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All athletes, newest first. Rows whose blob no longer parses are
    /// skipped with a warning instead of poisoning the whole list.
    pub async fn list(&self) -> Result<Vec<Atleta>, RecordError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT data FROM atletas ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        let mut atletas = Vec::with_capacity(rows.len());
        for (data,) in rows {
            match serde_json::from_str(&data) {
                Ok(atleta) => atletas.push(atleta),
                Err(e) => tracing::warn!("skipping unreadable athlete row: {}", e),
            }
        }

        Ok(atletas)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Atleta>, RecordError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM atletas WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some((data,)) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    /// Inserts or replaces a record, assigning id and creation timestamp
    /// when the payload lacks them.
    pub async fn upsert(&self, mut atleta: Atleta) -> Result<Atleta, RecordError> {
        atleta.ensure_identity();

        let data = serde_json::to_string(&atleta)?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO atletas (id, data, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&atleta.id)
        .bind(&data)
        .bind(&atleta.created_at)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(atleta)
    }

    /// Shallow-merges a patch into the stored record. `None` when the id is
    /// unknown. The stored id and creation timestamp survive the merge.
    pub async fn merge_update(&self, id: &str, patch: &Value) -> Result<Option<Atleta>, RecordError> {
        let Some(current) = self.get(id).await? else {
            return Ok(None);
        };

        let base = serde_json::to_value(&current)?;
        let merged: Atleta = serde_json::from_value(merge_record_patch(&base, patch))?;

        Ok(Some(self.upsert(merged).await?))
    }

    pub async fn delete(&self, id: &str) -> Result<bool, RecordError> {
        let result = sqlx::query("DELETE FROM atletas WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// The config singleton, or the default when none was stored yet.
    pub async fn get_config(&self) -> Result<AppConfig, RecordError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM app_config WHERE key = ?")
            .bind(CONFIG_ROW_KEY)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some((value,)) => Ok(serde_json::from_str(&value)?),
            None => Ok(AppConfig::default()),
        }
    }

    /// Shallow-merges a patch into the config singleton and stores it.
    pub async fn put_config(&self, patch: &Value) -> Result<AppConfig, RecordError> {
        let current = serde_json::to_value(self.get_config().await?)?;
        let merged: AppConfig = serde_json::from_value(merge_record_patch(&current, patch))?;

        let value = serde_json::to_string(&merged)?;
        sqlx::query(
            r#"
            INSERT INTO app_config (key, value)
            VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(CONFIG_ROW_KEY)
        .bind(&value)
        .execute(&self.pool)
        .await?;

        Ok(merged)
    }
}
