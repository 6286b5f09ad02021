//! Durable, append-only history of completed analyses.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{AnalysisResult, HistoryRecord};

/// Append/query store for completed analyses. Records are never updated or
/// deleted; queries return most-recent-first.
#[async_trait]
pub trait BaseHistoryStore: Send + Sync {
    /// Persist a completed analysis, assigning the record id and timestamp.
    async fn append(&self, result: &AnalysisResult) -> Result<HistoryRecord>;

    /// All persisted analyses, most recent first.
    async fn recent(&self) -> Result<Vec<HistoryRecord>>;

    /// Health probe for the backing store.
    async fn ping(&self) -> Result<()>;
}

/// PostgreSQL-backed history store. The result payload is stored as JSONB
/// alongside the queryable columns.
pub struct PostgresHistoryStore {
    pool: PgPool,
}

impl PostgresHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AnalysisRow {
    id: Uuid,
    result: serde_json::Value,
    analyzed_at: DateTime<Utc>,
}

#[async_trait]
impl BaseHistoryStore for PostgresHistoryStore {
    async fn append(&self, result: &AnalysisResult) -> Result<HistoryRecord> {
        let id = Uuid::new_v4();
        let analyzed_at = Utc::now();
        let payload =
            serde_json::to_value(result).context("Failed to serialize analysis result")?;

        sqlx::query(
            r#"
            INSERT INTO analyses (id, request_url, result, analyzed_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id)
        .bind(&result.request_url)
        .bind(&payload)
        .bind(analyzed_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert analysis record")?;

        Ok(HistoryRecord {
            id: id.to_string(),
            result: result.clone(),
            analyzed_at,
        })
    }

    async fn recent(&self) -> Result<Vec<HistoryRecord>> {
        let rows = sqlx::query_as::<_, AnalysisRow>(
            r#"
            SELECT id, result, analyzed_at
            FROM analyses
            ORDER BY analyzed_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to query analysis history")?;

        rows.into_iter()
            .map(|row| {
                let result: AnalysisResult = serde_json::from_value(row.result)
                    .context("Failed to deserialize stored analysis result")?;
                Ok(HistoryRecord {
                    id: row.id.to_string(),
                    result,
                    analyzed_at: row.analyzed_at,
                })
            })
            .collect()
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("History store unreachable")?;
        Ok(())
    }
}

/// In-memory history store for tests and local development without a
/// database.
#[derive(Default)]
pub struct InMemoryHistoryStore {
    records: RwLock<Vec<HistoryRecord>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl BaseHistoryStore for InMemoryHistoryStore {
    async fn append(&self, result: &AnalysisResult) -> Result<HistoryRecord> {
        let record = HistoryRecord {
            id: Uuid::new_v4().to_string(),
            result: result.clone(),
            analyzed_at: Utc::now(),
        };
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn recent(&self) -> Result<Vec<HistoryRecord>> {
        let mut records = self.records.read().await.clone();
        records.sort_by(|a, b| b.analyzed_at.cmp(&a.analyzed_at));
        Ok(records)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
