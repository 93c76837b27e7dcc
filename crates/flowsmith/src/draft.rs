//! The AI's rough workflow shape.
//!
//! A draft names node types and loose per-node parameters.  It is never
//! emitted as-is: every node goes through the template registry.

use flowsmith_nodes::Position;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{GenerateError, Result};

/// A workflow as proposed by the AI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowDraft {
    pub name: Option<String>,
    pub nodes: Vec<DraftNode>,
    /// Engine-native connection map, keyed by source node name.
    pub connections: Map<String, Value>,
}

/// One node of a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftNode {
    #[serde(rename = "type")]
    pub node_type: String,
    pub name: String,
    /// Becomes the template configuration.
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub position: Option<Position>,
}

impl WorkflowDraft {
    /// Read and check a draft from an extracted JSON object.
    pub fn from_object(object: Map<String, Value>) -> Result<Self> {
        let draft: Self =
            serde_json::from_value(Value::Object(object)).map_err(|e| GenerateError::InvalidDraft {
                reason: e.to_string(),
            })?;
        draft.validate()?;
        Ok(draft)
    }

    fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(GenerateError::InvalidDraft {
                reason: "draft has no nodes".into(),
            });
        }
        for (index, node) in self.nodes.iter().enumerate() {
            if node.node_type.trim().is_empty() {
                return Err(GenerateError::InvalidDraft {
                    reason: format!("node {index} has no type"),
                });
            }
            if node.name.trim().is_empty() {
                return Err(GenerateError::InvalidDraft {
                    reason: format!("node {index} has no name"),
                });
            }
        }
        Ok(())
    }
}
