//! Built-in node templates, one per supported node kind.

mod branch;
mod http;
mod merge;
mod trigger;

pub use branch::{IF_NODE_TYPE, IfTemplate, SWITCH_NODE_TYPE, SwitchTemplate};
pub use http::{
    HTTP_REQUEST_NODE_TYPE, HttpRequestTemplate, RESPOND_TO_WEBHOOK_NODE_TYPE,
    RespondToWebhookTemplate,
};
pub use merge::{MERGE_NODE_TYPE, MergeTemplate};
pub use trigger::{ERROR_TRIGGER_NODE_TYPE, ErrorTriggerTemplate, WEBHOOK_NODE_TYPE, WebhookTemplate};
