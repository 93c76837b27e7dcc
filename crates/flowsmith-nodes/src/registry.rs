//! Node template registry and factory.
//!
//! The registry maps node-type identifiers to [`NodeTemplate`]s.  It is
//! backed by [`DashMap`] so it can be shared across concurrent generations
//! without a global lock, and it is cheaply cloneable.
//!
//! [`NodeTemplateRegistry::create_node`] is the single entry point used
//! during workflow assembly: registered types go through their template,
//! everything else through a generic fallback, so any type the AI proposes
//! resolves to a structurally valid node.
//!
//! # Example
//!
//! ```rust
//! # use flowsmith_nodes::{NodeCreationConfig, NodeTemplateRegistry};
//! let registry = NodeTemplateRegistry::with_builtin_templates();
//!
//! let node = registry
//!     .create_node("n8n-nodes-base.if", NodeCreationConfig::new("1", "Check"))
//!     .unwrap();
//! assert_eq!(node.type_version, 1);
//!
//! let other = registry
//!     .create_node("acme.unknown", NodeCreationConfig::new("2", "Custom"))
//!     .unwrap();
//! assert_eq!(other.node_type, "acme.unknown");
//! ```

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info};

use crate::defaults::{is_webhook_type, resolve_parameters};
use crate::error::Result;
use crate::node::{NodeCreationConfig, WorkflowNode, new_webhook_id};
use crate::template::NodeTemplate;
use crate::templates::{
    ErrorTriggerTemplate, HttpRequestTemplate, IfTemplate, MergeTemplate,
    RespondToWebhookTemplate, SwitchTemplate, WebhookTemplate,
};

/// Namespace assumed for short type names such as `if` or `merge`.
pub const DEFAULT_NODE_NAMESPACE: &str = "n8n-nodes-base";

/// Schema version given to generic fallback nodes.
pub const GENERIC_TYPE_VERSION: u32 = 1;

/// Concurrent, type-keyed template registry.
#[derive(Clone, Default)]
pub struct NodeTemplateRegistry {
    inner: Arc<DashMap<String, Arc<dyn NodeTemplate>>>,
}

impl NodeTemplateRegistry {
    /// Create an empty registry.  Every type resolves through the fallback.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding all built-in templates.
    #[must_use]
    pub fn with_builtin_templates() -> Self {
        let registry = Self::new();
        registry.register(IfTemplate);
        registry.register(SwitchTemplate);
        registry.register(MergeTemplate);
        registry.register(ErrorTriggerTemplate);
        registry.register(WebhookTemplate);
        registry.register(HttpRequestTemplate);
        registry.register(RespondToWebhookTemplate);
        info!(templates = registry.len(), "built-in node templates registered");
        registry
    }

    /// Register a template under its own type identifier.
    ///
    /// A template already registered for the same type is replaced.
    pub fn register<T>(&self, template: T)
    where
        T: NodeTemplate + 'static,
    {
        self.register_arc(Arc::new(template));
    }

    /// Register a shared template.
    pub fn register_arc(&self, template: Arc<dyn NodeTemplate>) {
        let node_type = template.node_type().to_owned();
        debug!(node_type = %node_type, version = template.type_version(), "node template registered");
        self.inner.insert(node_type, template);
    }

    /// Look up the template for `node_type`.
    ///
    /// Short names without a namespace (`"if"`) also resolve against
    /// [`DEFAULT_NODE_NAMESPACE`].
    pub fn get(&self, node_type: &str) -> Option<Arc<dyn NodeTemplate>> {
        if let Some(entry) = self.inner.get(node_type) {
            return Some(Arc::clone(entry.value()));
        }
        if node_type.contains('.') {
            return None;
        }
        self.inner
            .get(&format!("{DEFAULT_NODE_NAMESPACE}.{node_type}"))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Whether a dedicated template exists for `node_type`.
    pub fn contains(&self, node_type: &str) -> bool {
        self.get(node_type).is_some()
    }

    /// Registered type identifiers, sorted.
    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.inner.iter().map(|e| e.key().clone()).collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Materialize a node of `node_type`.
    ///
    /// Registered types use their template.  Unregistered types become a
    /// generic node of exactly the requested type at version
    /// [`GENERIC_TYPE_VERSION`], with parameters from the quick default
    /// table and a fresh webhook id for webhook-triggered types.
    ///
    /// Only a missing id or name produces an error; mistyped configuration
    /// values fall back to the template's defaults.
    pub fn create_node(&self, node_type: &str, config: NodeCreationConfig) -> Result<WorkflowNode> {
        match self.get(node_type) {
            Some(template) => template.create_node(config),
            None => generic_node(node_type, config),
        }
    }
}

/// Build a node for a type with no dedicated template.
fn generic_node(node_type: &str, config: NodeCreationConfig) -> Result<WorkflowNode> {
    config.validate()?;

    let parameters = resolve_parameters(node_type, &config.configuration);
    let webhook_id = is_webhook_type(node_type).then(new_webhook_id);
    let position = config.position_or_default();

    debug!(
        node_id = %config.id,
        node_type,
        "node created via generic fallback"
    );

    Ok(WorkflowNode {
        id: config.id,
        name: config.name,
        node_type: node_type.to_owned(),
        type_version: GENERIC_TYPE_VERSION,
        position,
        parameters,
        webhook_id,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
