//! Generation error types.
//!
//! Only failures that make a workflow impossible surface here.  Unmatched
//! descriptions and unknown node types are handled in-band, and learning
//! failures are logged by the learning engine.

use flowsmith_nodes::NodeError;

use crate::ai::CompletionError;

/// Unified error type for workflow generation.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The description was empty or whitespace.
    #[error("workflow description is empty")]
    EmptyDescription,

    /// The AI reply contained no JSON object.
    #[error("AI response was not valid JSON")]
    MalformedAiResponse,

    /// The completion service failed.
    #[error("completion failed: {0}")]
    Completion(#[from] CompletionError),

    /// The AI reply was JSON but not a usable workflow draft.
    #[error("invalid workflow draft: {reason}")]
    InvalidDraft { reason: String },

    /// A draft node could not be materialized.
    #[error("node error: {0}")]
    Node(#[from] NodeError),

    /// Configuration could not be read or parsed.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

/// Convenience alias used throughout the facade crate.
pub type Result<T> = std::result::Result<T, GenerateError>;
