//! The assembled workflow.

use flowsmith_nodes::WorkflowNode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A generated workflow in the engine's import format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub name: String,
    pub nodes: Vec<WorkflowNode>,
    /// Passed through from the draft.  Keys are source node names.
    #[serde(default)]
    pub connections: Map<String, Value>,
}

impl Workflow {
    pub fn node(&self, name: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Count every edge in the connection map.
    ///
    /// The map has the shape `{source: {outputType: [[edge, ...], ...]}}`;
    /// entries that do not follow it are ignored.
    pub fn connection_count(&self) -> usize {
        self.connections
            .values()
            .filter_map(Value::as_object)
            .flat_map(|outputs| outputs.values())
            .filter_map(Value::as_array)
            .flatten()
            .filter_map(Value::as_array)
            .map(Vec::len)
            .sum()
    }

    /// Connection sources or targets that name no node in the workflow.
    pub fn dangling_connections(&self) -> Vec<String> {
        let mut missing = Vec::new();
        for (source, outputs) in &self.connections {
            if self.node(source).is_none() {
                missing.push(source.clone());
            }
            let targets = outputs
                .as_object()
                .into_iter()
                .flat_map(|o| o.values())
                .filter_map(Value::as_array)
                .flatten()
                .filter_map(Value::as_array)
                .flatten()
                .filter_map(|edge| edge.get("node").and_then(Value::as_str));
            for target in targets {
                if self.node(target).is_none() && !missing.iter().any(|m| m == target) {
                    missing.push(target.to_owned());
                }
            }
        }
        missing
    }
}
