//! Workflow node model.
//!
//! [`WorkflowNode`] serializes to the automation engine's node schema:
//! `{id, name, type, typeVersion, position: [x, y], parameters, webhookId?}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{NodeError, Result};

/// Canvas position used when a node is created without one.
pub const DEFAULT_POSITION: Position = Position(250.0, 300.0);

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A canvas coordinate, serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position(pub f64, pub f64);

impl Position {
    pub fn x(&self) -> f64 {
        self.0
    }

    pub fn y(&self) -> f64 {
        self.1
    }
}

impl Default for Position {
    fn default() -> Self {
        DEFAULT_POSITION
    }
}

// ---------------------------------------------------------------------------
// Node creation input
// ---------------------------------------------------------------------------

/// Generic per-node input handed to a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeCreationConfig {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// Loose hints extracted from the AI draft (`conditions`, `mode`, ...).
    /// Each template reads the fields it understands.
    #[serde(default)]
    pub configuration: Map<String, Value>,
}

impl NodeCreationConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position: None,
            configuration: Map::new(),
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_configuration(mut self, configuration: Map<String, Value>) -> Self {
        self.configuration = configuration;
        self
    }

    /// Set a single configuration entry.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.configuration.insert(key.into(), value.into());
        self
    }

    /// Check the fields every node needs regardless of type.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(NodeError::MissingField { field: "id" });
        }
        if self.name.trim().is_empty() {
            return Err(NodeError::MissingField { field: "name" });
        }
        Ok(())
    }

    /// The explicit position, or [`DEFAULT_POSITION`].
    pub fn position_or_default(&self) -> Position {
        self.position.unwrap_or(DEFAULT_POSITION)
    }
}

// ---------------------------------------------------------------------------
// Output node
// ---------------------------------------------------------------------------

/// A fully typed workflow node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowNode {
    pub id: String,
    pub name: String,
    /// Canonical node-type identifier (e.g. `n8n-nodes-base.if`).
    #[serde(rename = "type")]
    pub node_type: String,
    pub type_version: u32,
    pub position: Position,
    pub parameters: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_id: Option<String>,
}

/// Generate a webhook identifier: a random RFC 4122 version-4 UUID string.
pub fn new_webhook_id() -> String {
    Uuid::new_v4().to_string()
}
