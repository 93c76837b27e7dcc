//! Generation records — the immutable log the learning engine aggregates.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of the random suffix in generated record ids.
const ID_SUFFIX_LEN: usize = 9;

/// Shape summary of the workflow a generation produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub name: String,
    pub node_count: usize,
    pub connection_count: usize,
}

/// One attempt to produce a workflow from a prompt.  Never modified after
/// creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// `gen_<unix-millis>_<random suffix>`.
    pub id: String,
    pub prompt: String,
    pub workflow: WorkflowSummary,
    pub timestamp: DateTime<Utc>,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationRecord {
    /// Stamp an outcome with a fresh id and the current time.  Missing
    /// counts become zero.
    pub fn from_outcome(outcome: GenerationOutcome) -> Self {
        let timestamp = Utc::now();
        Self {
            id: generate_record_id(timestamp),
            prompt: outcome.prompt,
            workflow: WorkflowSummary {
                name: outcome.workflow_name,
                node_count: outcome.node_count.unwrap_or(0),
                connection_count: outcome.connection_count.unwrap_or(0),
            },
            timestamp,
            provider: outcome.provider,
            model: outcome.model,
            success: outcome.success,
            error: outcome.error,
        }
    }
}

/// What the orchestrator reports after a generation attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub prompt: String,
    pub workflow_name: String,
    #[serde(default)]
    pub node_count: Option<usize>,
    #[serde(default)]
    pub connection_count: Option<usize>,
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl GenerationOutcome {
    /// A successful generation.
    pub fn success(
        prompt: impl Into<String>,
        workflow_name: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            workflow_name: workflow_name.into(),
            provider: provider.into(),
            success: true,
            ..Self::default()
        }
    }

    /// A failed generation.
    pub fn failure(
        prompt: impl Into<String>,
        provider: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            provider: provider.into(),
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn with_counts(mut self, node_count: usize, connection_count: usize) -> Self {
        self.node_count = Some(node_count);
        self.connection_count = Some(connection_count);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Build a record id from a timestamp and a random base-36 suffix.
fn generate_record_id(timestamp: DateTime<Utc>) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| char::from_digit(rng.random_range(0..36), 36).unwrap_or('0'))
        .collect();
    format!("gen_{}_{suffix}", timestamp.timestamp_millis())
}
