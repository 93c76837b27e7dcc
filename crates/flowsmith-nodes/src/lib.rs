//! Node templates and template registry for flowsmith.
//!
//! Once the AI has proposed a rough workflow shape, every draft node is
//! materialized here into a typed, schema-correct [`WorkflowNode`]:
//!
//! - [`template::NodeTemplate`] — the per-type capability.
//! - [`templates`] — built-in templates (`if`, `switch`, `merge`,
//!   `errorTrigger`, `webhook`, `httpRequest`, `respondToWebhook`).
//! - [`registry::NodeTemplateRegistry`] — type-keyed lookup with a generic
//!   fallback for types without a template.
//! - [`defaults`] — the quick default-parameter table used by the fallback.

pub mod defaults;
pub mod error;
pub mod node;
pub mod registry;
pub mod template;
pub mod templates;

pub use error::{NodeError, Result};
pub use node::{DEFAULT_POSITION, NodeCreationConfig, Position, WorkflowNode, new_webhook_id};
pub use registry::{DEFAULT_NODE_NAMESPACE, GENERIC_TYPE_VERSION, NodeTemplateRegistry};
pub use template::NodeTemplate;
