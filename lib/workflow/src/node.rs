//! Workflow node types.
//!
//! Nodes are the building blocks of workflows. Each node has:
//! - A unique ID within the workflow (assigned by the graph editor)
//! - A kind selecting its executor
//! - A kind-specific configuration record

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use ulid::Ulid;

/// A unique identifier for a node within a workflow.
///
/// Node IDs are assigned by the graph editor and treated as opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Creates a node ID from an editor-assigned string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mints a fresh ULID-backed node ID for programmatic use.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The kind of a workflow node.
///
/// A closed set of variants dispatched through the executor registry.
/// Adding a node kind means adding one variant, one executor, and one
/// registry entry; the runner never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// User-initiated trigger.
    ManualTrigger,
    /// Google Form submission trigger.
    GoogleFormTrigger,
    /// Stripe payment event trigger.
    StripeTrigger,
    /// Outbound HTTP request.
    HttpRequest,
    /// OpenAI completion.
    #[serde(rename = "openai")]
    OpenAi,
    /// Anthropic completion.
    Anthropic,
    /// Gemini completion.
    Gemini,
    /// Slack incoming-webhook post.
    Slack,
    /// Discord webhook post.
    Discord,
}

impl NodeKind {
    /// Returns the serde tag for this kind.
    #[must_use]
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::ManualTrigger => "manual_trigger",
            Self::GoogleFormTrigger => "google_form_trigger",
            Self::StripeTrigger => "stripe_trigger",
            Self::HttpRequest => "http_request",
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
            Self::Slack => "slack",
            Self::Discord => "discord",
        }
    }

    /// Returns the status channel name owned by this node kind.
    ///
    /// Each kind has a dedicated channel with a single `status` topic;
    /// UI subscribers filter events by channel and node ID.
    #[must_use]
    pub fn channel(&self) -> &'static str {
        match self {
            Self::ManualTrigger => "manual-trigger-execution",
            Self::GoogleFormTrigger => "google-form-trigger-execution",
            Self::StripeTrigger => "stripe-trigger-execution",
            Self::HttpRequest => "http-request-execution",
            Self::OpenAi => "openai-execution",
            Self::Anthropic => "anthropic-execution",
            Self::Gemini => "gemini-execution",
            Self::Slack => "slack-execution",
            Self::Discord => "discord-execution",
        }
    }

    /// Returns true if this kind is a trigger (a workflow entry point).
    #[must_use]
    pub fn is_trigger(&self) -> bool {
        matches!(
            self,
            Self::ManualTrigger | Self::GoogleFormTrigger | Self::StripeTrigger
        )
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// A workflow node.
///
/// The `data` record holds kind-specific configuration (prompts, model name,
/// webhook URL, credential reference, output variable name) exactly as the
/// graph editor saved it. It is immutable once an execution starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node within the workflow.
    pub id: NodeId,
    /// Node kind (selects the executor).
    pub kind: NodeKind,
    /// Kind-specific configuration.
    #[serde(default)]
    pub data: JsonValue,
}

impl Node {
    /// Creates a new node.
    #[must_use]
    pub fn new(id: impl Into<NodeId>, kind: NodeKind, data: JsonValue) -> Self {
        Self {
            id: id.into(),
            kind,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_kind_serde_tags() {
        let json = serde_json::to_string(&NodeKind::OpenAi).expect("serialize");
        assert_eq!(json, "\"openai\"");

        let json = serde_json::to_string(&NodeKind::GoogleFormTrigger).expect("serialize");
        assert_eq!(json, "\"google_form_trigger\"");

        let parsed: NodeKind = serde_json::from_str("\"slack\"").expect("deserialize");
        assert_eq!(parsed, NodeKind::Slack);
    }

    #[test]
    fn node_kind_channels_are_distinct() {
        use std::collections::HashSet;

        let kinds = [
            NodeKind::ManualTrigger,
            NodeKind::GoogleFormTrigger,
            NodeKind::StripeTrigger,
            NodeKind::HttpRequest,
            NodeKind::OpenAi,
            NodeKind::Anthropic,
            NodeKind::Gemini,
            NodeKind::Slack,
            NodeKind::Discord,
        ];
        let channels: HashSet<_> = kinds.iter().map(|k| k.channel()).collect();
        assert_eq!(channels.len(), kinds.len());
    }

    #[test]
    fn trigger_classification() {
        assert!(NodeKind::ManualTrigger.is_trigger());
        assert!(NodeKind::StripeTrigger.is_trigger());
        assert!(!NodeKind::Slack.is_trigger());
        assert!(!NodeKind::OpenAi.is_trigger());
    }

    #[test]
    fn node_serde_roundtrip() {
        let node = Node::new(
            "node-1",
            NodeKind::Slack,
            serde_json::json!({"variableName": "n1", "content": "hi"}),
        );
        let json = serde_json::to_string(&node).expect("serialize");
        let parsed: Node = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(node, parsed);
    }

    #[test]
    fn generated_node_ids_are_unique() {
        assert_ne!(NodeId::generate(), NodeId::generate());
    }
}
