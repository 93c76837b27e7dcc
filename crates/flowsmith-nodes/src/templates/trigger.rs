//! Trigger templates: error boundary and incoming webhook.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::error::Result;
use crate::node::NodeCreationConfig;
use crate::template::{NodeTemplate, params, read_config};

pub const ERROR_TRIGGER_NODE_TYPE: &str = "n8n-nodes-base.errorTrigger";
pub const WEBHOOK_NODE_TYPE: &str = "n8n-nodes-base.webhook";

// ---------------------------------------------------------------------------
// Error trigger
// ---------------------------------------------------------------------------

/// Graph anchor for error-handling edges.  Takes no configuration; its
/// parameters are always empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorTriggerTemplate;

impl NodeTemplate for ErrorTriggerTemplate {
    fn node_type(&self) -> &'static str {
        ERROR_TRIGGER_NODE_TYPE
    }

    fn type_version(&self) -> u32 {
        1
    }

    fn parameters(&self, _config: &NodeCreationConfig) -> Result<Map<String, Value>> {
        Ok(Map::new())
    }
}

// ---------------------------------------------------------------------------
// Webhook
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WebhookConfig {
    http_method: Option<String>,
    path: Option<String>,
    response_mode: Option<String>,
}

/// Incoming HTTP trigger.  Every node gets a fresh webhook id; the path
/// defaults to a slug of the node name.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebhookTemplate;

impl NodeTemplate for WebhookTemplate {
    fn node_type(&self) -> &'static str {
        WEBHOOK_NODE_TYPE
    }

    fn type_version(&self) -> u32 {
        1
    }

    fn assigns_webhook_id(&self) -> bool {
        true
    }

    fn parameters(&self, config: &NodeCreationConfig) -> Result<Map<String, Value>> {
        let cfg: WebhookConfig = read_config(WEBHOOK_NODE_TYPE, &config.configuration);

        let method = cfg
            .http_method
            .map(|m| m.to_uppercase())
            .unwrap_or_else(|| "POST".to_owned());
        let path = cfg
            .path
            .map(|p| p.trim_matches('/').to_owned())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| slug(&config.name));
        let response_mode = cfg.response_mode.unwrap_or_else(|| "onReceived".to_owned());

        Ok(params([
            ("httpMethod", json!(method)),
            ("path", json!(path)),
            ("responseMode", json!(response_mode)),
            ("options", json!({})),
        ]))
    }
}

/// Lowercase, dash-separated ASCII slug; `webhook` if nothing usable remains.
fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "webhook".to_owned()
    } else {
        trimmed.to_owned()
    }
}
