//! SQLite-backed [`FeedbackStore`].
//!
//! Each [`GenerationRecord`] is one row in `generation_records`.  Rows are
//! read back in insertion order, so a restarted learning engine sees the
//! same history it had before.

use chrono::{DateTime, Utc};
use flowsmith_learning::{FeedbackStore, GenerationRecord, WorkflowSummary};
use rusqlite::Row;
use tracing::{debug, instrument};

use crate::db::Database;
use crate::error::{StoreError, StoreResult};

// ═══════════════════════════════════════════════════════════════════════
//  SqliteFeedbackStore
// ═══════════════════════════════════════════════════════════════════════

/// Generation history persisted in SQLite.
#[derive(Clone)]
pub struct SqliteFeedbackStore {
    db: Database,
}

impl SqliteFeedbackStore {
    /// Create a store backed by `db`.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert `records` in one transaction.  Re-inserting a record id is a
    /// no-op.
    #[instrument(skip_all, fields(records = records.len()))]
    pub async fn insert_batch(&self, records: &[GenerationRecord]) -> StoreResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let rows: Vec<RecordRow> = records.iter().map(RecordRow::from_record).collect();

        let inserted = self
            .db
            .call(move |conn| {
                let tx = conn.transaction()?;
                let mut inserted = 0;
                {
                    let mut stmt = tx.prepare(
                        "INSERT OR IGNORE INTO generation_records \
                         (id, prompt, workflow_name, node_count, connection_count, timestamp, provider, model, success, error) \
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    )?;
                    for row in &rows {
                        inserted += stmt.execute(rusqlite::params![
                            row.id,
                            row.prompt,
                            row.workflow_name,
                            row.node_count,
                            row.connection_count,
                            row.timestamp,
                            row.provider,
                            row.model,
                            row.success,
                            row.error,
                        ])?;
                    }
                }
                tx.commit()?;
                Ok(inserted)
            })
            .await?;

        debug!(inserted, "generation records persisted");
        Ok(inserted)
    }

    /// The `limit` most recent records, oldest first.
    #[instrument(skip(self))]
    pub async fn recent(&self, limit: usize) -> StoreResult<Vec<GenerationRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = self
            .db
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, prompt, workflow_name, node_count, connection_count, timestamp, provider, model, success, error \
                     FROM (SELECT * FROM generation_records ORDER BY seq DESC LIMIT ?1) \
                     ORDER BY seq ASC",
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![limit], RecordRow::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;

        rows.into_iter().map(RecordRow::into_record).collect()
    }

    /// Total number of stored records.
    pub async fn count(&self) -> StoreResult<usize> {
        let count: i64 = self
            .db
            .call(|conn| {
                Ok(conn.query_row("SELECT count(*) FROM generation_records", [], |row| row.get(0))?)
            })
            .await?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

#[async_trait::async_trait]
impl FeedbackStore for SqliteFeedbackStore {
    async fn append(&self, records: &[GenerationRecord]) -> flowsmith_learning::Result<()> {
        self.insert_batch(records).await?;
        Ok(())
    }

    async fn load_recent(&self, limit: usize) -> flowsmith_learning::Result<Vec<GenerationRecord>> {
        Ok(self.recent(limit).await?)
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Row mapping
// ═══════════════════════════════════════════════════════════════════════

/// Flat column representation of a record.
struct RecordRow {
    id: String,
    prompt: String,
    workflow_name: String,
    node_count: i64,
    connection_count: i64,
    timestamp: String,
    provider: String,
    model: Option<String>,
    success: bool,
    error: Option<String>,
}

impl RecordRow {
    fn from_record(record: &GenerationRecord) -> Self {
        Self {
            id: record.id.clone(),
            prompt: record.prompt.clone(),
            workflow_name: record.workflow.name.clone(),
            node_count: i64::try_from(record.workflow.node_count).unwrap_or(i64::MAX),
            connection_count: i64::try_from(record.workflow.connection_count).unwrap_or(i64::MAX),
            timestamp: record.timestamp.to_rfc3339(),
            provider: record.provider.clone(),
            model: record.model.clone(),
            success: record.success,
            error: record.error.clone(),
        }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            prompt: row.get(1)?,
            workflow_name: row.get(2)?,
            node_count: row.get(3)?,
            connection_count: row.get(4)?,
            timestamp: row.get(5)?,
            provider: row.get(6)?,
            model: row.get(7)?,
            success: row.get(8)?,
            error: row.get(9)?,
        })
    }

    fn into_record(self) -> StoreResult<GenerationRecord> {
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map_err(|e| StoreError::CorruptRow {
                id: self.id.clone(),
                reason: format!("bad timestamp '{}': {e}", self.timestamp),
            })?
            .with_timezone(&Utc);

        Ok(GenerationRecord {
            id: self.id,
            prompt: self.prompt,
            workflow: WorkflowSummary {
                name: self.workflow_name,
                node_count: usize::try_from(self.node_count).unwrap_or(0),
                connection_count: usize::try_from(self.connection_count).unwrap_or(0),
            },
            timestamp,
            provider: self.provider,
            model: self.model,
            success: self.success,
            error: self.error,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use flowsmith_learning::GenerationOutcome;

    use super::*;
    use crate::db::IN_MEMORY;

    async fn setup() -> SqliteFeedbackStore {
        let db = Database::open(IN_MEMORY).await.unwrap();
        SqliteFeedbackStore::new(db)
    }

    fn record(prompt: &str) -> GenerationRecord {
        GenerationRecord::from_outcome(
            GenerationOutcome::success(prompt, format!("{prompt} flow"), "openai")
                .with_counts(3, 2)
                .with_model("gpt-4o"),
        )
    }

    #[tokio::test]
    async fn records_round_trip() {
        let store = setup().await;
        let original = record("a");
        store.insert_batch(std::slice::from_ref(&original)).await.unwrap();

        let loaded = store.recent(10).await.unwrap();
        assert_eq!(loaded, vec![original]);
    }

    #[tokio::test]
    async fn failures_keep_their_error() {
        let store = setup().await;
        let failed = GenerationRecord::from_outcome(GenerationOutcome::failure(
            "b",
            "openai",
            "AI response was not valid JSON",
        ));
        store.insert_batch(&[failed]).await.unwrap();

        let loaded = store.recent(1).await.unwrap();
        assert!(!loaded[0].success);
        assert_eq!(loaded[0].error.as_deref(), Some("AI response was not valid JSON"));
        assert!(loaded[0].model.is_none());
    }

    #[tokio::test]
    async fn recent_returns_tail_in_insertion_order() {
        let store = setup().await;
        store
            .insert_batch(&[record("1"), record("2"), record("3")])
            .await
            .unwrap();
        store.insert_batch(&[record("4")]).await.unwrap();

        let prompts: Vec<String> = store
            .recent(2)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.prompt)
            .collect();
        assert_eq!(prompts, vec!["3", "4"]);
    }

    #[tokio::test]
    async fn duplicate_ids_are_ignored() {
        let store = setup().await;
        let r = record("a");
        assert_eq!(store.insert_batch(&[r.clone(), r.clone()]).await.unwrap(), 1);
        assert_eq!(store.insert_batch(&[r]).await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let store = setup().await;
        assert_eq!(store.insert_batch(&[]).await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
