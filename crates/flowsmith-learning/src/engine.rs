//! The learning engine.
//!
//! Records every generation attempt and turns the accumulated history into
//! prompt hints.  The engine is constructed explicitly and shared behind an
//! `Arc`; it never fails a generation.  Store errors and oversized prompts
//! are logged with `warn!` and the engine degrades to a pass-through.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::LearningConfig;
use crate::context::{LearningContext, common_errors, derive_context, practices_for_errors};
use crate::error::{LearningError, Result};
use crate::record::{GenerationOutcome, GenerationRecord};
use crate::store::FeedbackStore;

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Aggregate view over the whole history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningMetrics {
    pub total_generations: usize,
    /// Fraction of successful generations in `[0, 1]`; `0.0` when empty.
    pub success_rate: f64,
    pub common_errors: Vec<String>,
    pub best_practices: Vec<String>,
}

// ---------------------------------------------------------------------------
// Persistence queue
// ---------------------------------------------------------------------------

/// Records waiting for the store, shared with the background flusher.
struct PersistQueue {
    pending: Mutex<Vec<GenerationRecord>>,
    /// Held for the whole take/append/requeue cycle so batches reach the
    /// store in recording order.
    flush_lock: Mutex<()>,
    /// Most records kept queued; older ones are dropped when exceeded.
    capacity: usize,
}

impl PersistQueue {
    fn new(capacity: usize) -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            flush_lock: Mutex::new(()),
            capacity: capacity.max(1),
        }
    }

    async fn push(&self, record: GenerationRecord) {
        let mut pending = self.pending.lock().await;
        pending.push(record);
        drop_overflow(&mut pending, self.capacity);
    }

    async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Drain the queue into `store`.  On failure the batch is put back in
    /// front of anything queued meanwhile.
    async fn flush(&self, store: &dyn FeedbackStore) {
        let _serial = self.flush_lock.lock().await;

        let batch = std::mem::take(&mut *self.pending.lock().await);
        if batch.is_empty() {
            return;
        }

        match store.append(&batch).await {
            Ok(()) => debug!(records = batch.len(), "generation records flushed"),
            Err(e) => {
                warn!(error = %e, records = batch.len(), "failed to flush generation records");
                let mut pending = self.pending.lock().await;
                let newer = std::mem::replace(&mut *pending, batch);
                pending.extend(newer);
                drop_overflow(&mut pending, self.capacity);
            }
        }
    }
}

fn drop_overflow(pending: &mut Vec<GenerationRecord>, capacity: usize) {
    if pending.len() <= capacity {
        return;
    }
    let excess = pending.len() - capacity;
    let dropped: Vec<GenerationRecord> = pending.drain(..excess).collect();
    warn!(
        dropped = dropped.len(),
        oldest = %dropped[0].id,
        capacity,
        "persistence queue full, dropping oldest unsaved records"
    );
}

/// Handle to the running background flusher.
struct Flusher {
    handle: JoinHandle<()>,
    shutdown: Arc<Notify>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Append-only generation history with optional scheduled persistence.
pub struct LearningEngine {
    config: LearningConfig,
    history: RwLock<Vec<GenerationRecord>>,
    store: Option<Arc<dyn FeedbackStore>>,
    queue: Arc<PersistQueue>,
    flusher: Mutex<Option<Flusher>>,
}

impl LearningEngine {
    /// Create an engine with an in-memory history only.
    pub fn new(config: LearningConfig) -> Self {
        Self::with_parts(config, Vec::new(), None)
    }

    /// Create an engine backed by `store`, seeding the history with the
    /// most recent stored records.
    ///
    /// A failing store is logged and the engine starts with an empty
    /// history.
    pub async fn with_store(config: LearningConfig, store: Arc<dyn FeedbackStore>) -> Self {
        let seeded = match store.load_recent(config.history_limit).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "failed to load generation history, starting empty");
                Vec::new()
            }
        };
        info!(records = seeded.len(), "learning history loaded");

        Self::with_parts(config, seeded, Some(store))
    }

    fn with_parts(
        config: LearningConfig,
        history: Vec<GenerationRecord>,
        store: Option<Arc<dyn FeedbackStore>>,
    ) -> Self {
        let queue = Arc::new(PersistQueue::new(config.history_limit));
        Self {
            config,
            history: RwLock::new(history),
            store,
            queue,
            flusher: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    /// Spawn the background task that flushes queued records every
    /// `flush_interval`.  Does nothing without a store or when already
    /// running.
    pub async fn start_persistence(&self) {
        let Some(store) = self.store.clone() else {
            debug!("no feedback store attached, persistence not started");
            return;
        };

        let mut flusher = self.flusher.lock().await;
        if flusher.is_some() {
            return;
        }

        let queue = Arc::clone(&self.queue);
        let shutdown = Arc::new(Notify::new());
        let signal = Arc::clone(&shutdown);
        let period = self.config.flush_interval();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => queue.flush(store.as_ref()).await,
                    _ = signal.notified() => break,
                }
            }
            debug!("learning flusher exited");
        });
        *flusher = Some(Flusher { handle, shutdown });

        info!(interval_secs = period.as_secs(), "learning persistence started");
    }

    /// Record one generation attempt.  Never fails.
    ///
    /// The record is queued for the store while the history write lock is
    /// held, so the store sees records in history order.
    pub async fn record_generation(&self, outcome: GenerationOutcome) {
        let record = GenerationRecord::from_outcome(outcome);
        debug!(
            record_id = %record.id,
            success = record.success,
            nodes = record.workflow.node_count,
            "generation recorded"
        );

        let mut history = self.history.write().await;
        if self.store.is_some() {
            self.queue.push(record.clone()).await;
        }
        history.push(record);
    }

    /// Append learned context to `prompt`.
    ///
    /// Returns the prompt unchanged when there is nothing to add, or when
    /// the enhanced prompt would exceed `max_prompt_chars`.
    pub async fn enhance_prompt(&self, prompt: &str) -> String {
        match self.try_enhance(prompt).await {
            Ok(enhanced) => enhanced,
            Err(e) => {
                warn!(error = %e, "prompt enhancement failed, using original prompt");
                prompt.to_owned()
            }
        }
    }

    async fn try_enhance(&self, prompt: &str) -> Result<String> {
        let context = self.learning_context(prompt).await;
        if context.is_empty() {
            return Ok(prompt.to_owned());
        }

        let enhanced = format!("{prompt}\n\n{}", context.render());
        let len = enhanced.chars().count();
        if len > self.config.max_prompt_chars {
            return Err(LearningError::PromptTooLong {
                len,
                limit: self.config.max_prompt_chars,
            });
        }

        debug!(
            patterns = context.common_patterns.len(),
            errors = context.avoid_errors.len(),
            practices = context.best_practices.len(),
            "prompt enhanced"
        );
        Ok(enhanced)
    }

    /// Derive the learning context for `prompt` from the current history.
    pub async fn learning_context(&self, prompt: &str) -> LearningContext {
        let history = self.history.read().await;
        derive_context(&history, prompt, &self.config)
    }

    /// Aggregate metrics over the full history.
    pub async fn metrics(&self) -> LearningMetrics {
        let history = self.history.read().await;
        let total = history.len();
        let successes = history.iter().filter(|r| r.success).count();
        let success_rate = if total == 0 {
            0.0
        } else {
            successes as f64 / total as f64
        };

        LearningMetrics {
            total_generations: total,
            success_rate,
            common_errors: common_errors(&history, self.config.max_context_items),
            best_practices: practices_for_errors(&history, self.config.max_context_items),
        }
    }

    /// A consistent snapshot of the history, oldest first.
    pub async fn history(&self) -> Vec<GenerationRecord> {
        self.history.read().await.clone()
    }

    /// Number of records waiting for the next flush.
    pub async fn pending_len(&self) -> usize {
        self.queue.len().await
    }

    /// Write queued records to the store now.
    pub async fn flush(&self) {
        if let Some(store) = &self.store {
            self.queue.flush(store.as_ref()).await;
        }
    }

    /// Stop the background task and flush what is still queued.  A flush
    /// already in progress is allowed to finish first.  The history stays
    /// available.
    pub async fn stop(&self) {
        let flusher = self.flusher.lock().await.take();
        if let Some(Flusher { handle, shutdown }) = flusher {
            shutdown.notify_one();
            if let Err(e) = handle.await {
                warn!(error = %e, "learning flusher ended abnormally");
            }
            info!("learning persistence stopped");
        }
        self.flush().await;
    }
}

impl Drop for LearningEngine {
    fn drop(&mut self) {
        if let Some(flusher) = self.flusher.get_mut().take() {
            flusher.handle.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::store::InMemoryFeedbackStore;

    #[tokio::test]
    async fn empty_history_leaves_prompt_unchanged() {
        let engine = LearningEngine::new(LearningConfig::default());
        assert_eq!(engine.enhance_prompt("send a slack alert").await, "send a slack alert");
    }

    #[tokio::test]
    async fn enhanced_prompt_appends_context() {
        let engine = LearningEngine::new(LearningConfig::default());
        engine
            .record_generation(GenerationOutcome::success("slack alert on webhook", "Webhook Alert", "openai"))
            .await;

        let enhanced = engine.enhance_prompt("slack alert").await;
        assert!(enhanced.starts_with("slack alert\n\nContext from previous generations:"));
        assert!(enhanced.contains("- Webhook Alert"));
    }

    #[tokio::test]
    async fn oversized_enhancement_falls_back_to_original() {
        let engine = LearningEngine::new(LearningConfig {
            max_prompt_chars: 20,
            ..LearningConfig::default()
        });
        engine
            .record_generation(GenerationOutcome::failure("x", "openai", "AI response was not valid JSON"))
            .await;
        assert_eq!(engine.enhance_prompt("build it").await, "build it");
    }

    #[tokio::test]
    async fn metrics_over_empty_and_mixed_history() {
        let engine = LearningEngine::new(LearningConfig::default());
        let empty = engine.metrics().await;
        assert_eq!(empty.total_generations, 0);
        assert_eq!(empty.success_rate, 0.0);

        engine.record_generation(GenerationOutcome::success("a", "A", "p")).await;
        engine.record_generation(GenerationOutcome::success("b", "B", "p")).await;
        engine.record_generation(GenerationOutcome::success("c", "C", "p")).await;
        engine
            .record_generation(GenerationOutcome::failure("d", "p", "request timeout"))
            .await;

        let metrics = engine.metrics().await;
        assert_eq!(metrics.total_generations, 4);
        assert!((metrics.success_rate - 0.75).abs() < f64::EPSILON);
        assert_eq!(metrics.common_errors, vec!["request timeout"]);
        assert_eq!(metrics.best_practices.len(), 1);
    }

    #[tokio::test]
    async fn without_store_nothing_is_queued() {
        let engine = LearningEngine::new(LearningConfig::default());
        engine.record_generation(GenerationOutcome::success("a", "A", "p")).await;
        assert_eq!(engine.pending_len().await, 0);
        assert_eq!(engine.history().await.len(), 1);
    }

    #[tokio::test]
    async fn with_store_seeds_history() {
        let seed = vec![GenerationRecord::from_outcome(GenerationOutcome::success(
            "old", "Old", "p",
        ))];
        let store = Arc::new(InMemoryFeedbackStore::with_records(seed));
        let engine = LearningEngine::with_store(LearningConfig::default(), store).await;
        assert_eq!(engine.history().await[0].prompt, "old");
    }

    struct FlakyStore {
        fail: AtomicBool,
        inner: InMemoryFeedbackStore,
    }

    #[async_trait::async_trait]
    impl FeedbackStore for FlakyStore {
        async fn append(&self, records: &[GenerationRecord]) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(LearningError::Store {
                    reason: "disk full".into(),
                });
            }
            self.inner.append(records).await
        }

        async fn load_recent(&self, _limit: usize) -> Result<Vec<GenerationRecord>> {
            Err(LearningError::Store {
                reason: "unavailable".into(),
            })
        }
    }

    #[tokio::test]
    async fn failed_flush_requeues_records() {
        let store = Arc::new(FlakyStore {
            fail: AtomicBool::new(true),
            inner: InMemoryFeedbackStore::new(),
        });
        let engine = LearningEngine::with_store(LearningConfig::default(), store.clone()).await;
        assert!(engine.history().await.is_empty());

        engine.record_generation(GenerationOutcome::success("a", "A", "p")).await;
        engine.flush().await;
        assert_eq!(engine.pending_len().await, 1);

        engine.record_generation(GenerationOutcome::success("b", "B", "p")).await;
        store.fail.store(false, Ordering::SeqCst);
        engine.flush().await;
        assert_eq!(engine.pending_len().await, 0);

        let stored = store.inner.load_recent(10).await.unwrap();
        let prompts: Vec<&str> = stored.iter().map(|r| r.prompt.as_str()).collect();
        assert_eq!(prompts, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn unsaved_queue_is_capped_at_history_limit() {
        let store = Arc::new(FlakyStore {
            fail: AtomicBool::new(true),
            inner: InMemoryFeedbackStore::new(),
        });
        let config = LearningConfig {
            history_limit: 3,
            ..LearningConfig::default()
        };
        let engine = LearningEngine::with_store(config, store.clone()).await;

        for prompt in ["a", "b", "c", "d", "e"] {
            engine.record_generation(GenerationOutcome::success(prompt, "W", "p")).await;
        }
        assert_eq!(engine.pending_len().await, 3);
        assert_eq!(engine.history().await.len(), 5);

        engine.flush().await;
        assert_eq!(engine.pending_len().await, 3);

        store.fail.store(false, Ordering::SeqCst);
        engine.flush().await;
        let stored = store.inner.load_recent(10).await.unwrap();
        let prompts: Vec<&str> = stored.iter().map(|r| r.prompt.as_str()).collect();
        assert_eq!(prompts, vec!["c", "d", "e"]);
    }

    #[tokio::test]
    async fn stop_without_started_task_still_flushes() {
        let store = Arc::new(InMemoryFeedbackStore::new());
        let engine = LearningEngine::with_store(LearningConfig::default(), store.clone()).await;
        engine.record_generation(GenerationOutcome::success("a", "A", "p")).await;
        engine.stop().await;
        assert_eq!(store.load_recent(10).await.unwrap().len(), 1);
        assert_eq!(engine.pending_len().await, 0);
    }
}
