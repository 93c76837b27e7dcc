//! # flowsmith
//!
//! Turns a free-text automation request into a typed workflow graph.
//!
//! [`WorkflowGenerator`] ties the pieces together: the pattern catalog
//! ranks known workflow shapes for the request, the learning engine adds
//! context from earlier generations, an injected [`CompletionService`]
//! proposes a draft, and the node template registry materializes each
//! draft node into a schema-correct node.
//!
//! ```ignore
//! use std::sync::Arc;
//! use flowsmith::{GenerationRequest, GeneratorConfig, WorkflowGenerator};
//! use flowsmith_learning::LearningEngine;
//!
//! flowsmith::telemetry::init_tracing("info");
//! let config = GeneratorConfig::from_env();
//! let learning = Arc::new(LearningEngine::new(config.learning.clone()));
//! let generator = WorkflowGenerator::new(config, Arc::new(MyProvider::new()), learning);
//!
//! let generated = generator
//!     .generate(GenerationRequest::new("post to slack when a form is submitted"))
//!     .await?;
//! println!("{}", serde_json::to_string_pretty(&generated.workflow)?);
//! ```

pub mod ai;
pub mod config;
pub mod draft;
pub mod error;
pub mod generator;
pub mod telemetry;
pub mod workflow;

pub use ai::{CompletionError, CompletionRequest, CompletionService, extract_json};
pub use config::GeneratorConfig;
pub use draft::{DraftNode, WorkflowDraft};
pub use error::{GenerateError, Result};
pub use generator::{GeneratedWorkflow, GenerationRequest, WorkflowGenerator};
pub use workflow::Workflow;

pub use flowsmith_learning as learning;
pub use flowsmith_nodes as nodes;
pub use flowsmith_patterns as patterns;
