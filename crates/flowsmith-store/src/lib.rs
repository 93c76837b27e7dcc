//! # flowsmith-store
//!
//! SQLite persistence for the learning engine's generation history.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  SqliteFeedbackStore (FeedbackStore)    │
//! ├─────────────────────────────────────────┤
//! │  Database (rusqlite WAL, blocking pool) │
//! │  Migrations (user_version, per-step tx) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ```ignore
//! use std::sync::Arc;
//! use flowsmith_learning::{LearningConfig, LearningEngine};
//! use flowsmith_store::{Database, SqliteFeedbackStore};
//!
//! let db = Database::open("data/feedback.db").await?;
//! let store = Arc::new(SqliteFeedbackStore::new(db));
//! let engine = LearningEngine::with_store(LearningConfig::default(), store).await;
//! engine.start_persistence().await;
//! ```

pub mod db;
pub mod error;
pub mod feedback_store;
pub mod migration;

pub use db::{Database, IN_MEMORY};
pub use error::{StoreError, StoreResult};
pub use feedback_store::SqliteFeedbackStore;
