//! Data-merge template.

use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::warn;

use crate::error::Result;
use crate::node::NodeCreationConfig;
use crate::template::{NodeTemplate, params, read_config};

pub const MERGE_NODE_TYPE: &str = "n8n-nodes-base.merge";

const DEFAULT_MERGE_MODE: &str = "append";
const MERGE_INPUTS: u32 = 2;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MergeConfig {
    mode: Option<String>,
    input_count: Option<u32>,
}

/// Joins two incoming branches.
///
/// `mode` defaults to `append`.  `inputCount` is read but not emitted: the
/// merge schema at this version has exactly two inputs, so larger counts
/// are logged and otherwise ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeTemplate;

impl NodeTemplate for MergeTemplate {
    fn node_type(&self) -> &'static str {
        MERGE_NODE_TYPE
    }

    fn type_version(&self) -> u32 {
        2
    }

    fn parameters(&self, config: &NodeCreationConfig) -> Result<Map<String, Value>> {
        let cfg: MergeConfig = read_config(MERGE_NODE_TYPE, &config.configuration);

        let input_count = cfg.input_count.unwrap_or(MERGE_INPUTS);
        if input_count != MERGE_INPUTS {
            warn!(
                node_id = %config.id,
                input_count,
                "merge node supports exactly two inputs; extra inputs need chained merges"
            );
        }

        let mode = cfg
            .mode
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MERGE_MODE.to_owned());

        Ok(params([("mode", json!(mode))]))
    }
}
