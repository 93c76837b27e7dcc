//! Pattern catalog error types.
//!
//! Matching itself never fails; only loading an external catalog can.

/// Errors raised while loading a pattern catalog.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    /// The catalog document could not be deserialized.
    #[error("invalid pattern catalog: {0}")]
    Json(#[from] serde_json::Error),

    /// Two catalog entries share the same identifier.
    #[error("duplicate pattern id: {id}")]
    DuplicateId { id: String },

    /// A platform name did not match any supported platform.
    #[error("unknown platform: {name}")]
    UnknownPlatform { name: String },
}

/// Convenience alias used throughout the patterns crate.
pub type Result<T> = std::result::Result<T, PatternError>;
