//! Feedback store errors.
//!
//! The learning engine only sees these as `LearningError::Store`, carrying
//! the rendered message.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A schema step failed and was rolled back.
    #[error("schema migration to v{version} failed: {message}")]
    Migration { version: u32, message: String },

    /// A stored generation record could not be decoded.
    #[error("generation record {id} is corrupt: {reason}")]
    CorruptRow { id: String, reason: String },

    /// The blocking task running a query was cancelled or panicked, or the
    /// connection lock was poisoned.
    #[error("store task failed: {0}")]
    TaskJoin(String),
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskJoin(err.to_string())
    }
}

impl From<StoreError> for flowsmith_learning::LearningError {
    fn from(err: StoreError) -> Self {
        Self::Store {
            reason: err.to_string(),
        }
    }
}
