//! Learning engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for context derivation and scheduled persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Maximum entries per context list.
    pub max_context_items: usize,
    /// Significant terms a past prompt must share with the query to count
    /// as similar.
    pub min_shared_terms: usize,
    /// Seconds between background flushes to the feedback store.
    pub flush_interval_secs: u64,
    /// Records loaded from the store at startup.
    pub history_limit: usize,
    /// Enhanced prompts longer than this fall back to the original prompt.
    pub max_prompt_chars: usize,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            max_context_items: 3,
            min_shared_terms: 1,
            flush_interval_secs: 30,
            history_limit: 500,
            max_prompt_chars: 16_000,
        }
    }
}

impl LearningConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs.max(1))
    }
}
