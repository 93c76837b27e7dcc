//! The AI completion boundary.
//!
//! Generation talks to a language model only through [`CompletionService`]:
//! plain text in, plain text out.  Provider clients live outside this
//! crate.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{GenerateError, Result};

/// One completion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// System instruction, if the provider supports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub prompt: String,
    pub model: String,
    pub temperature: f32,
}

/// Errors a completion service may report.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// The provider could not be reached or rejected the request.
    #[error("{provider} request failed: {reason}")]
    Request { provider: String, reason: String },

    /// The provider answered with no content.
    #[error("{provider} returned an empty response")]
    EmptyResponse { provider: String },
}

/// Text-in, text-out language model access.
#[async_trait::async_trait]
pub trait CompletionService: Send + Sync {
    /// Complete `request` and return the raw reply text.
    async fn complete(&self, request: &CompletionRequest) -> std::result::Result<String, CompletionError>;
}

/// Return the first well-formed JSON object in `text`.
///
/// Markdown fences and prose around the object are tolerated.  Text with
/// no parseable object fails with [`GenerateError::MalformedAiResponse`].
pub fn extract_json(text: &str) -> Result<Map<String, Value>> {
    for (start, _) in text.match_indices('{') {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        if let Some(Ok(Value::Object(object))) = stream.next() {
            return Ok(object);
        }
    }
    Err(GenerateError::MalformedAiResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_object() {
        let object = extract_json(r#"{"name": "x", "nodes": []}"#).unwrap();
        assert_eq!(object["name"], "x");
    }

    #[test]
    fn fenced_object_with_prose() {
        let text = "Here is your workflow:\n```json\n{\"name\": \"Alert\", \"nodes\": [{\"type\": \"a\"}]}\n```\nEnjoy!";
        let object = extract_json(text).unwrap();
        assert_eq!(object["name"], "Alert");
        assert_eq!(object["nodes"][0]["type"], "a");
    }

    #[test]
    fn skips_broken_braces_before_the_object() {
        let text = "Use {placeholders} like this: {\"ok\": true}";
        let object = extract_json(text).unwrap();
        assert_eq!(object["ok"], true);
    }

    #[test]
    fn first_object_wins() {
        let object = extract_json(r#"{"a": 1} and {"b": 2}"#).unwrap();
        assert!(object.contains_key("a"));
        assert!(!object.contains_key("b"));
    }

    #[test]
    fn prose_only_is_malformed() {
        let err = extract_json("I cannot help with that.").unwrap_err();
        assert!(matches!(err, GenerateError::MalformedAiResponse));
        assert_eq!(err.to_string(), "AI response was not valid JSON");
    }

    #[test]
    fn truncated_object_is_malformed() {
        assert!(matches!(
            extract_json(r#"{"name": "x", "nodes": ["#),
            Err(GenerateError::MalformedAiResponse)
        ));
    }
}
