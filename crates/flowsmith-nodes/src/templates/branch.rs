//! Branching templates: two-way `If` and multi-way `Switch`.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::error::Result;
use crate::node::NodeCreationConfig;
use crate::template::{NodeTemplate, params, read_config};

pub const IF_NODE_TYPE: &str = "n8n-nodes-base.if";
pub const SWITCH_NODE_TYPE: &str = "n8n-nodes-base.switch";

/// Field compared by a synthesized `If` condition.
const DEFAULT_CONDITION_FIELD: &str = "score";
const DEFAULT_THRESHOLD: i64 = 50;

/// Field routed on by a `Switch` when none is configured.
const DEFAULT_SWITCH_FIELD: &str = "type";
const DEFAULT_SWITCH_OPTIONS: [&str; 3] = ["option1", "option2", "option3"];

// ---------------------------------------------------------------------------
// If
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct IfConfig {
    /// A complete condition set, passed through untouched.
    conditions: Option<Value>,
    /// `all` or `any`; only emitted when given.
    combine_operation: Option<String>,
    /// Field for the synthesized condition.
    field: Option<String>,
    /// Threshold for the synthesized condition.
    threshold: Option<f64>,
}

/// Two-way branch on a condition set.
///
/// Without an explicit condition set a single numeric condition
/// `$json.<field> <= threshold` is synthesized (defaults: `score`, `50`).
#[derive(Debug, Clone, Copy, Default)]
pub struct IfTemplate;

impl NodeTemplate for IfTemplate {
    fn node_type(&self) -> &'static str {
        IF_NODE_TYPE
    }

    fn type_version(&self) -> u32 {
        1
    }

    fn parameters(&self, config: &NodeCreationConfig) -> Result<Map<String, Value>> {
        let cfg: IfConfig = read_config(IF_NODE_TYPE, &config.configuration);

        let conditions = match cfg.conditions {
            Some(conditions) if !conditions.is_null() => conditions,
            _ => {
                let field = cfg.field.as_deref().unwrap_or(DEFAULT_CONDITION_FIELD);
                let threshold = cfg.threshold.map_or(json!(DEFAULT_THRESHOLD), |t| json!(t));
                json!({
                    "number": [{
                        "value1": format!("={{{{ $json.{field} }}}}"),
                        "operation": "smallerEqual",
                        "value2": threshold,
                    }]
                })
            }
        };

        let mut parameters = params([("conditions", conditions)]);
        if let Some(op) = cfg.combine_operation {
            parameters.insert("combineOperation".into(), Value::String(op));
        }
        Ok(parameters)
    }
}

// ---------------------------------------------------------------------------
// Switch
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SwitchConfig {
    options: Vec<Value>,
    field: Option<String>,
    /// Engine-native routing rules, `{"rules": [{"value2": ...}, ...]}` or a
    /// bare list.  Their `value2` literals are used when `options` is empty.
    rules: Option<Value>,
    /// Engine-native routing expression, used when `field` is absent.
    value1: Option<String>,
}

/// Multi-way router: one output per option plus a fallback output.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwitchTemplate;

impl NodeTemplate for SwitchTemplate {
    fn node_type(&self) -> &'static str {
        SWITCH_NODE_TYPE
    }

    fn type_version(&self) -> u32 {
        1
    }

    fn parameters(&self, config: &NodeCreationConfig) -> Result<Map<String, Value>> {
        let cfg: SwitchConfig = read_config(SWITCH_NODE_TYPE, &config.configuration);

        let mut options: Vec<String> = cfg.options.iter().map(option_label).collect();
        if options.is_empty() {
            options = cfg.rules.as_ref().map(native_rule_values).unwrap_or_default();
        }
        if options.is_empty() {
            options = DEFAULT_SWITCH_OPTIONS.iter().map(|s| (*s).to_owned()).collect();
        }
        let value1 = match (cfg.field, cfg.value1) {
            (Some(field), _) => format!("={{{{ $json.{field} }}}}"),
            (None, Some(expression)) if !expression.trim().is_empty() => expression,
            _ => format!("={{{{ $json.{DEFAULT_SWITCH_FIELD} }}}}"),
        };

        let rules: Vec<Value> = options
            .iter()
            .enumerate()
            .map(|(output, value)| {
                json!({
                    "operation": "equal",
                    "value2": value,
                    "output": output,
                })
            })
            .collect();

        Ok(params([
            ("mode", json!("rules")),
            ("dataType", json!("string")),
            ("value1", json!(value1)),
            ("rules", json!({ "rules": rules })),
            ("fallbackOutput", json!(options.len())),
        ]))
    }
}

/// Comparison literals of engine-native switch rules.
fn native_rule_values(rules: &Value) -> Vec<String> {
    let list = match rules {
        Value::Array(list) => Some(list),
        Value::Object(map) => map.get("rules").and_then(Value::as_array),
        _ => None,
    };
    list.into_iter()
        .flatten()
        .filter_map(|rule| rule.get("value2"))
        .map(option_label)
        .collect()
}

/// Render an option literal as the string the rule compares against.
fn option_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn if_without_configuration_synthesizes_threshold_condition() {
        let node = IfTemplate
            .create_node(NodeCreationConfig::new("1", "Check"))
            .unwrap();
        let numbers = node.parameters["conditions"]["number"].as_array().unwrap();
        assert_eq!(numbers.len(), 1);
        assert_eq!(numbers[0]["operation"], "smallerEqual");
        assert_eq!(numbers[0]["value2"], json!(50));
        assert!(numbers[0]["value2"].is_i64());
        assert_eq!(numbers[0]["value1"], "={{ $json.score }}");
        assert_eq!(node.type_version, 1);
        assert!(node.webhook_id.is_none());
    }

    #[test]
    fn if_passes_explicit_conditions_through() {
        let conditions = json!({"string": [{"value1": "={{ $json.status }}", "value2": "ok"}]});
        let node = IfTemplate
            .create_node(
                NodeCreationConfig::new("1", "Check").with_option("conditions", conditions.clone()),
            )
            .unwrap();
        assert_eq!(node.parameters["conditions"], conditions);
        assert_eq!(node.parameters.len(), 1);
    }

    #[test]
    fn if_ignores_mistyped_threshold() {
        let node = IfTemplate
            .create_node(
                NodeCreationConfig::new("1", "Check")
                    .with_option("threshold", "50")
                    .with_option("field", "risk"),
            )
            .unwrap();
        let condition = &node.parameters["conditions"]["number"][0];
        assert_eq!(condition["value2"], json!(50));
        assert_eq!(condition["value1"], "={{ $json.risk }}");
    }

    #[test]
    fn if_keeps_configured_threshold() {
        let node = IfTemplate
            .create_node(NodeCreationConfig::new("1", "Check").with_option("threshold", 75.5))
            .unwrap();
        assert_eq!(node.parameters["conditions"]["number"][0]["value2"], 75.5);
    }

    #[test]
    fn switch_ignores_mistyped_options() {
        let node = SwitchTemplate
            .create_node(NodeCreationConfig::new("1", "Route").with_option("options", json!({})))
            .unwrap();
        let rules = node.parameters["rules"]["rules"].as_array().unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(node.parameters["fallbackOutput"], 3);
    }

    #[test]
    fn switch_reads_engine_native_rules() {
        let node = SwitchTemplate
            .create_node(
                NodeCreationConfig::new("1", "Route")
                    .with_option("options", json!({}))
                    .with_option("value1", "={{ $json.method }}")
                    .with_option(
                        "rules",
                        json!({"rules": [
                            {"operation": "equal", "value2": "card", "output": 0},
                            {"operation": "equal", "value2": "paypal", "output": 1}
                        ]}),
                    ),
            )
            .unwrap();
        let rules = node.parameters["rules"]["rules"].as_array().unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0]["value2"], "card");
        assert_eq!(rules[1]["value2"], "paypal");
        assert_eq!(node.parameters["fallbackOutput"], 2);
        assert_eq!(node.parameters["value1"], "={{ $json.method }}");
    }

    #[test]
    fn explicit_options_win_over_native_rules() {
        let node = SwitchTemplate
            .create_node(
                NodeCreationConfig::new("1", "Route")
                    .with_option("options", json!(["a"]))
                    .with_option("rules", json!([{"value2": "x"}, {"value2": "y"}])),
            )
            .unwrap();
        assert_eq!(node.parameters["rules"]["rules"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn switch_builds_one_rule_per_option_plus_fallback() {
        let node = SwitchTemplate
            .create_node(
                NodeCreationConfig::new("1", "Route")
                    .with_option("options", json!(["card", "paypal"]))
                    .with_option("field", "method"),
            )
            .unwrap();

        let rules = node.parameters["rules"]["rules"].as_array().unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0]["value2"], "card");
        assert_eq!(rules[0]["output"], 0);
        assert_eq!(rules[1]["value2"], "paypal");
        assert_eq!(rules[1]["output"], 1);
        assert_eq!(node.parameters["fallbackOutput"], 2);
        assert_eq!(node.parameters["value1"], "={{ $json.method }}");
    }

    #[test]
    fn switch_defaults_to_three_placeholder_options() {
        let node = SwitchTemplate
            .create_node(NodeCreationConfig::new("1", "Route"))
            .unwrap();
        let rules = node.parameters["rules"]["rules"].as_array().unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[2]["value2"], "option3");
        assert_eq!(node.parameters["fallbackOutput"], 3);
        assert_eq!(node.parameters["value1"], "={{ $json.type }}");
    }

    #[test]
    fn switch_stringifies_non_string_options() {
        let node = SwitchTemplate
            .create_node(NodeCreationConfig::new("1", "Route").with_option("options", json!([1, true])))
            .unwrap();
        let rules = node.parameters["rules"]["rules"].as_array().unwrap();
        assert_eq!(rules[0]["value2"], "1");
        assert_eq!(rules[1]["value2"], "true");
    }
}
