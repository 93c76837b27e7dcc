//! Quick default-parameter table for node types without a dedicated
//! template.
//!
//! The generic fallback in the registry starts from these defaults.  Types
//! listed here have a known parameter shape, so only the keys declared in
//! the table are taken from the caller's configuration.  Types that are not
//! listed have no known shape and keep their configuration as-is.

use serde_json::{Map, Value, json};

/// Default parameters for well-known node types, or `None` when the type
/// has no entry.
pub fn default_parameters(node_type: &str) -> Option<Map<String, Value>> {
    let value = match node_type {
        "n8n-nodes-base.manualTrigger" | "n8n-nodes-base.noOp" => json!({}),
        "n8n-nodes-base.scheduleTrigger" => json!({
            "rule": { "interval": [{ "field": "hours" }] }
        }),
        "n8n-nodes-base.formTrigger" => json!({
            "formTitle": "",
            "formFields": { "values": [] }
        }),
        "n8n-nodes-base.set" => json!({ "values": {}, "options": {} }),
        "n8n-nodes-base.code" => json!({ "jsCode": "return $input.all();" }),
        "n8n-nodes-base.wait" => json!({ "amount": 1, "unit": "minutes" }),
        "n8n-nodes-base.slack" => json!({ "channel": "", "text": "" }),
        "n8n-nodes-base.emailSend" => json!({
            "fromEmail": "",
            "toEmail": "",
            "subject": "",
            "text": ""
        }),
        "n8n-nodes-base.googleSheets" => json!({ "operation": "append", "options": {} }),
        _ => return None,
    };

    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Resolve parameters for a generic node.
///
/// Known types keep their default shape, overlaid with configuration values
/// for declared keys.  Unknown types pass the configuration through.
pub fn resolve_parameters(node_type: &str, configuration: &Map<String, Value>) -> Map<String, Value> {
    match default_parameters(node_type) {
        Some(mut defaults) => {
            for (key, slot) in defaults.iter_mut() {
                if let Some(value) = configuration.get(key) {
                    *slot = value.clone();
                }
            }
            defaults
        }
        None => configuration.clone(),
    }
}

/// Whether `node_type` names a webhook-triggered node.
pub fn is_webhook_type(node_type: &str) -> bool {
    let local = node_type.rsplit('.').next().unwrap_or(node_type);
    local.to_ascii_lowercase().contains("webhook")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_type_keeps_shape() {
        let mut configuration = Map::new();
        configuration.insert("text".into(), json!("hello"));
        configuration.insert("unrelated".into(), json!(true));

        let params = resolve_parameters("n8n-nodes-base.slack", &configuration);
        assert_eq!(params["text"], "hello");
        assert_eq!(params["channel"], "");
        assert!(!params.contains_key("unrelated"));
    }

    #[test]
    fn unknown_type_passes_configuration_through() {
        let mut configuration = Map::new();
        configuration.insert("chatId".into(), json!("42"));
        let params = resolve_parameters("n8n-nodes-base.telegram", &configuration);
        assert_eq!(params, configuration);
        assert!(resolve_parameters("custom.thing", &Map::new()).is_empty());
    }

    #[test]
    fn webhook_type_detection() {
        assert!(is_webhook_type("n8n-nodes-base.webhook"));
        assert!(is_webhook_type("acme.incomingWebhookTrigger"));
        assert!(!is_webhook_type("n8n-nodes-base.slack"));
    }
}
