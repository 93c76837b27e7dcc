//! Feedback store abstraction.
//!
//! The engine keeps its history in memory; a [`FeedbackStore`] makes it
//! survive restarts.  `flowsmith-store` provides the SQLite implementation.

use tokio::sync::Mutex;

use crate::error::Result;
use crate::record::GenerationRecord;

/// Durable storage for generation records.
#[async_trait::async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Append a batch of records, preserving order.
    async fn append(&self, records: &[GenerationRecord]) -> Result<()>;

    /// Load up to `limit` of the most recent records, oldest first.
    async fn load_recent(&self, limit: usize) -> Result<Vec<GenerationRecord>>;
}

/// A store that keeps records in memory.  Useful for tests and for running
/// without a database.
#[derive(Debug, Default)]
pub struct InMemoryFeedbackStore {
    records: Mutex<Vec<GenerationRecord>>,
}

impl InMemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<GenerationRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait::async_trait]
impl FeedbackStore for InMemoryFeedbackStore {
    async fn append(&self, records: &[GenerationRecord]) -> Result<()> {
        self.records.lock().await.extend_from_slice(records);
        Ok(())
    }

    async fn load_recent(&self, limit: usize) -> Result<Vec<GenerationRecord>> {
        let records = self.records.lock().await;
        let skip = records.len().saturating_sub(limit);
        Ok(records[skip..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::GenerationOutcome;

    fn record(prompt: &str) -> GenerationRecord {
        GenerationRecord::from_outcome(GenerationOutcome::success(prompt, "wf", "test"))
    }

    #[tokio::test]
    async fn load_recent_returns_tail_in_order() {
        let store = InMemoryFeedbackStore::new();
        store
            .append(&[record("a"), record("b"), record("c")])
            .await
            .unwrap();

        let recent = store.load_recent(2).await.unwrap();
        let prompts: Vec<&str> = recent.iter().map(|r| r.prompt.as_str()).collect();
        assert_eq!(prompts, vec!["b", "c"]);
        assert_eq!(store.load_recent(10).await.unwrap().len(), 3);
    }
}
