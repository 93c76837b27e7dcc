//! Learning engine error types.
//!
//! These errors never reach the generation path: the engine logs them and
//! degrades to a pass-through.  They surface only from store
//! implementations and the fallible internals.

/// Unified error type for the learning subsystem.
#[derive(Debug, thiserror::Error)]
pub enum LearningError {
    /// The feedback store failed to append or load records.
    #[error("feedback store error: {reason}")]
    Store { reason: String },

    /// The enhanced prompt would exceed the configured size limit.
    #[error("enhanced prompt too long ({len} chars, limit {limit})")]
    PromptTooLong { len: usize, limit: usize },
}

/// Convenience alias used throughout the learning crate.
pub type Result<T> = std::result::Result<T, LearningError>;
