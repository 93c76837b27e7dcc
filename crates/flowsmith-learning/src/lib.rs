//! Learning and feedback for workflow generation.
//!
//! [`LearningEngine`] keeps an append-only history of generation attempts
//! and derives prompt hints from it: names of similar successful
//! workflows, recurring errors, and advice keyed on those errors.  An
//! optional [`FeedbackStore`] persists the history on a schedule.

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod record;
pub mod store;

pub use config::LearningConfig;
pub use context::LearningContext;
pub use engine::{LearningEngine, LearningMetrics};
pub use error::{LearningError, Result};
pub use record::{GenerationOutcome, GenerationRecord, WorkflowSummary};
pub use store::{FeedbackStore, InMemoryFeedbackStore};
