//! Node construction error types.

/// Errors raised while materializing a workflow node.
///
/// An unknown node type is never an error: it resolves through the generic
/// fallback in [`crate::registry::NodeTemplateRegistry::create_node`].
/// Mistyped configuration values are ignored with a warning.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// A required node field was empty.
    #[error("node is missing required field `{field}`")]
    MissingField { field: &'static str },
}

/// Convenience alias used throughout the nodes crate.
pub type Result<T> = std::result::Result<T, NodeError>;
