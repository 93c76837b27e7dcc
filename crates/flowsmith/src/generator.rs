//! Workflow generation pipeline.
//!
//! `description` → pattern match → prompt (with pattern hints) → learned
//! context → AI completion → draft → typed nodes → [`Workflow`].  Every
//! attempt, successful or not, is reported to the learning engine.

use std::sync::Arc;

use flowsmith_learning::{GenerationOutcome, LearningEngine};
use flowsmith_nodes::{DEFAULT_POSITION, NodeCreationConfig, NodeTemplateRegistry, Position};
use flowsmith_patterns::{PatternMatcher, Platform, WorkflowPattern};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ai::{CompletionRequest, CompletionService, extract_json};
use crate::config::GeneratorConfig;
use crate::draft::WorkflowDraft;
use crate::error::{GenerateError, Result};
use crate::workflow::Workflow;

/// Name used when neither the request, the draft, nor a pattern offers one.
const FALLBACK_WORKFLOW_NAME: &str = "Generated workflow";

// ---------------------------------------------------------------------------
// System prompt
// ---------------------------------------------------------------------------

const SYSTEM_PROMPT: &str = r#"You are a workflow automation designer. Given a description, design a workflow for an automation engine.

Respond ONLY with a JSON object:
{
  "name": "short workflow name",
  "nodes": [
    {"type": "n8n-nodes-base.webhook", "name": "Unique node name", "parameters": {}}
  ],
  "connections": {
    "Source node name": {"main": [[{"node": "Target node name", "type": "main", "index": 0}]]}
  }
}

Rules:
- Every node needs a type and a unique name.
- Put only the settings that matter in "parameters"; defaults are filled in for you.
- Connections reference nodes by name.

Parameters understood per node type (anything else is passed through as given):
- n8n-nodes-base.webhook: "httpMethod", "path", "responseMode"
- n8n-nodes-base.httpRequest: "method", "url"
- n8n-nodes-base.respondToWebhook: "respondWith", "responseBody"
- n8n-nodes-base.if: "field" and numeric "threshold" for a `field <= threshold` check, or a full "conditions" object; optional "combineOperation"
- n8n-nodes-base.switch: "options" (array of values to route on, one output each) and "field" (the item field compared)
- n8n-nodes-base.merge: "mode", "inputCount"
- n8n-nodes-base.errorTrigger: no parameters"#;

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// What the caller wants generated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub description: String,
    /// Target platform; the configured default when `None`.
    #[serde(default)]
    pub platform: Option<Platform>,
    /// Explicit workflow name.
    #[serde(default)]
    pub name: Option<String>,
}

impl GenerationRequest {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A generated workflow and the patterns that shaped it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedWorkflow {
    pub workflow: Workflow,
    pub platform: Platform,
    /// Ids of matched catalog patterns, most relevant first.
    pub matched_patterns: Vec<String>,
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Turns free-text requests into workflows.
pub struct WorkflowGenerator<'c> {
    config: GeneratorConfig,
    matcher: PatternMatcher<'c>,
    registry: NodeTemplateRegistry,
    learning: Arc<LearningEngine>,
    ai: Arc<dyn CompletionService>,
}

impl WorkflowGenerator<'static> {
    /// A generator over the built-in catalog and built-in node templates.
    pub fn new(
        config: GeneratorConfig,
        ai: Arc<dyn CompletionService>,
        learning: Arc<LearningEngine>,
    ) -> Self {
        Self::with_parts(
            config,
            PatternMatcher::builtin(),
            NodeTemplateRegistry::with_builtin_templates(),
            ai,
            learning,
        )
    }
}

impl<'c> WorkflowGenerator<'c> {
    /// A generator with a custom matcher and template registry.
    pub fn with_parts(
        config: GeneratorConfig,
        matcher: PatternMatcher<'c>,
        registry: NodeTemplateRegistry,
        ai: Arc<dyn CompletionService>,
        learning: Arc<LearningEngine>,
    ) -> Self {
        Self {
            config,
            matcher,
            registry,
            learning,
            ai,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn registry(&self) -> &NodeTemplateRegistry {
        &self.registry
    }

    pub fn learning(&self) -> &Arc<LearningEngine> {
        &self.learning
    }

    /// Generate a workflow for `request`.
    ///
    /// The outcome is recorded with the learning engine whether or not
    /// generation succeeds.
    pub async fn generate(&self, request: GenerationRequest) -> Result<GeneratedWorkflow> {
        let description = request.description.trim();
        if description.is_empty() {
            return Err(GenerateError::EmptyDescription);
        }
        let platform = request.platform.unwrap_or(self.config.platform);

        let matched = self.matcher.match_patterns(description, Some(platform));
        let matched_patterns: Vec<String> = matched.iter().map(|p| p.id.clone()).collect();
        info!(
            platform = %platform,
            matches = matched_patterns.len(),
            top = matched_patterns.first().map(String::as_str).unwrap_or("-"),
            "generating workflow"
        );

        let result = self
            .build_workflow(description, platform, &matched, request.name.as_deref())
            .await;

        let outcome = match &result {
            Ok(workflow) => GenerationOutcome::success(description, &workflow.name, &self.config.provider)
                .with_counts(workflow.nodes.len(), workflow.connection_count()),
            Err(e) => GenerationOutcome::failure(description, &self.config.provider, e.to_string()),
        }
        .with_model(&self.config.model);
        self.learning.record_generation(outcome).await;

        match result {
            Ok(workflow) => {
                info!(
                    workflow = %workflow.name,
                    nodes = workflow.nodes.len(),
                    connections = workflow.connection_count(),
                    "workflow generated"
                );
                Ok(GeneratedWorkflow {
                    workflow,
                    platform,
                    matched_patterns,
                })
            }
            Err(e) => {
                warn!(error = %e, "workflow generation failed");
                Err(e)
            }
        }
    }

    async fn build_workflow(
        &self,
        description: &str,
        platform: Platform,
        matched: &[&WorkflowPattern],
        name: Option<&str>,
    ) -> Result<Workflow> {
        let prompt = build_prompt(description, platform, matched, self.config.pattern_hints);
        let prompt = self.learning.enhance_prompt(&prompt).await;

        let reply = self
            .ai
            .complete(&CompletionRequest {
                system: Some(SYSTEM_PROMPT.to_owned()),
                prompt,
                model: self.config.model.clone(),
                temperature: self.config.temperature,
            })
            .await?;

        let draft = WorkflowDraft::from_object(extract_json(&reply)?)?;
        debug!(nodes = draft.nodes.len(), "draft received");

        let name = name
            .map(str::to_owned)
            .or_else(|| draft.name.clone().filter(|n| !n.trim().is_empty()))
            .or_else(|| matched.first().map(|p| p.name.clone()))
            .unwrap_or_else(|| FALLBACK_WORKFLOW_NAME.to_owned());

        self.assemble(name, draft)
    }

    /// Materialize every draft node and attach the draft's connections.
    fn assemble(&self, name: String, draft: WorkflowDraft) -> Result<Workflow> {
        let nodes = draft
            .nodes
            .into_iter()
            .enumerate()
            .map(|(index, node)| {
                let position = node
                    .position
                    .unwrap_or_else(|| layout_position(index, self.config.node_spacing));
                let config = NodeCreationConfig::new(Uuid::new_v4().to_string(), node.name)
                    .with_position(position)
                    .with_configuration(node.parameters);
                self.registry.create_node(&node.node_type, config)
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let workflow = Workflow {
            name,
            nodes,
            connections: draft.connections,
        };

        let dangling = workflow.dangling_connections();
        if !dangling.is_empty() {
            warn!(names = ?dangling, "connections reference unknown nodes");
        }
        Ok(workflow)
    }
}

/// Left-to-right layout starting at the default node position.
fn layout_position(index: usize, spacing: f64) -> Position {
    Position(DEFAULT_POSITION.x() + index as f64 * spacing, DEFAULT_POSITION.y())
}

/// The user prompt: description, target platform, and up to `hints`
/// matched patterns with their platform steps.
fn build_prompt(
    description: &str,
    platform: Platform,
    matched: &[&WorkflowPattern],
    hints: usize,
) -> String {
    let mut prompt = format!("Create a {platform} workflow: {description}\n");

    for pattern in matched.iter().take(hints) {
        prompt.push_str(&format!(
            "\nA known pattern fits this request: {} ({}).\n",
            pattern.name, pattern.description
        ));
        if let Some(template) = pattern.template_for(platform) {
            prompt.push_str(&format!("Typical steps: {}\n", template.steps.join(" -> ")));
            if let Some(notes) = &template.notes {
                prompt.push_str(&format!("Notes: {notes}\n"));
            }
        }
    }
    prompt
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
