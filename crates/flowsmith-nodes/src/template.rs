//! The node template capability.
//!
//! Every node kind the registry knows about implements [`NodeTemplate`]:
//! it declares a fixed type identifier and version, and turns a generic
//! [`NodeCreationConfig`] into schema-correct parameters.  The provided
//! [`NodeTemplate::create_node`] handles everything that is shared across
//! kinds (validation, default position, webhook ids).

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::Result;
use crate::node::{NodeCreationConfig, WorkflowNode, new_webhook_id};

/// A builder for one node type at one schema version.
pub trait NodeTemplate: Send + Sync {
    /// Canonical node-type identifier, e.g. `n8n-nodes-base.if`.
    fn node_type(&self) -> &'static str;

    /// Schema version of the emitted parameters.
    fn type_version(&self) -> u32;

    /// Build the node parameters from the creation config.
    fn parameters(&self, config: &NodeCreationConfig) -> Result<Map<String, Value>>;

    /// Whether nodes of this kind receive a fresh webhook identifier.
    fn assigns_webhook_id(&self) -> bool {
        false
    }

    /// Materialize a complete node.
    fn create_node(&self, config: NodeCreationConfig) -> Result<WorkflowNode> {
        config.validate()?;
        let parameters = self.parameters(&config)?;
        let position = config.position_or_default();

        debug!(
            node_id = %config.id,
            node_type = self.node_type(),
            "node created from template"
        );

        Ok(WorkflowNode {
            id: config.id,
            name: config.name,
            node_type: self.node_type().to_owned(),
            type_version: self.type_version(),
            position,
            parameters,
            webhook_id: self.assigns_webhook_id().then(new_webhook_id),
        })
    }
}

/// Read the loose configuration map into a template's typed record.
///
/// An empty map yields the record's defaults.  Unknown keys are ignored.
/// Known keys whose value has the wrong JSON type are dropped with a
/// warning, so the record falls back to its default for those fields.
pub(crate) fn read_config<T>(node_type: &str, configuration: &Map<String, Value>) -> T
where
    T: DeserializeOwned + Default,
{
    if configuration.is_empty() {
        return T::default();
    }
    if let Ok(cfg) = serde_json::from_value(Value::Object(configuration.clone())) {
        return cfg;
    }

    let mut usable = Map::new();
    for (key, value) in configuration {
        let single = Map::from_iter([(key.clone(), value.clone())]);
        match serde_json::from_value::<T>(Value::Object(single)) {
            Ok(_) => {
                usable.insert(key.clone(), value.clone());
            }
            Err(e) => warn!(
                node_type,
                key = %key,
                error = %e,
                "ignoring mistyped configuration value"
            ),
        }
    }

    serde_json::from_value(Value::Object(usable)).unwrap_or_else(|e| {
        warn!(node_type, error = %e, "configuration unusable, using template defaults");
        T::default()
    })
}

/// Build a parameter map from `(key, value)` pairs.
pub(crate) fn params<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect()
}
