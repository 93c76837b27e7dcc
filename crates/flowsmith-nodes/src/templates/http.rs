//! HTTP templates: outgoing request and webhook response.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::error::Result;
use crate::node::NodeCreationConfig;
use crate::template::{NodeTemplate, params, read_config};

pub const HTTP_REQUEST_NODE_TYPE: &str = "n8n-nodes-base.httpRequest";
pub const RESPOND_TO_WEBHOOK_NODE_TYPE: &str = "n8n-nodes-base.respondToWebhook";

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct HttpRequestConfig {
    method: Option<String>,
    url: Option<String>,
}

/// Outgoing HTTP call.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpRequestTemplate;

impl NodeTemplate for HttpRequestTemplate {
    fn node_type(&self) -> &'static str {
        HTTP_REQUEST_NODE_TYPE
    }

    fn type_version(&self) -> u32 {
        4
    }

    fn parameters(&self, config: &NodeCreationConfig) -> Result<Map<String, Value>> {
        let cfg: HttpRequestConfig = read_config(HTTP_REQUEST_NODE_TYPE, &config.configuration);
        let method = cfg
            .method
            .map(|m| m.to_uppercase())
            .unwrap_or_else(|| "GET".to_owned());

        Ok(params([
            ("method", json!(method)),
            ("url", json!(cfg.url.unwrap_or_default())),
            ("options", json!({})),
        ]))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RespondConfig {
    respond_with: Option<String>,
    response_body: Option<String>,
}

/// Sends the response for a webhook started with `responseMode: responseNode`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RespondToWebhookTemplate;

impl NodeTemplate for RespondToWebhookTemplate {
    fn node_type(&self) -> &'static str {
        RESPOND_TO_WEBHOOK_NODE_TYPE
    }

    fn type_version(&self) -> u32 {
        1
    }

    fn parameters(&self, config: &NodeCreationConfig) -> Result<Map<String, Value>> {
        let cfg: RespondConfig = read_config(RESPOND_TO_WEBHOOK_NODE_TYPE, &config.configuration);

        Ok(params([
            ("respondWith", json!(cfg.respond_with.unwrap_or_else(|| "json".to_owned()))),
            (
                "responseBody",
                json!(cfg.response_body.unwrap_or_else(|| "={{ $json }}".to_owned())),
            ),
            ("options", json!({})),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_request_defaults() {
        let node = HttpRequestTemplate
            .create_node(NodeCreationConfig::new("1", "Fetch"))
            .unwrap();
        assert_eq!(node.parameters["method"], "GET");
        assert_eq!(node.parameters["url"], "");
        assert_eq!(node.type_version, 4);
    }

    #[test]
    fn http_request_keeps_url_and_normalizes_method() {
        let node = HttpRequestTemplate
            .create_node(
                NodeCreationConfig::new("1", "Post")
                    .with_option("method", "post")
                    .with_option("url", "https://example.com/api"),
            )
            .unwrap();
        assert_eq!(node.parameters["method"], "POST");
        assert_eq!(node.parameters["url"], "https://example.com/api");
    }

    #[test]
    fn respond_defaults_to_json_echo() {
        let node = RespondToWebhookTemplate
            .create_node(NodeCreationConfig::new("1", "Respond"))
            .unwrap();
        assert_eq!(node.parameters["respondWith"], "json");
        assert_eq!(node.parameters["responseBody"], "={{ $json }}");
    }
}
