//! Chat post executors (Slack, Discord).
//!
//! Posts a rendered message to an incoming-webhook URL and binds the
//! rendered content under the node's output variable so downstream nodes
//! can reference what was actually sent.

use crate::http::WebhookPoster;
use async_trait::async_trait;
use flowline_workflow::{
    ExecutionContext, ExecutorInvocation, NodeError, NodeExecutor, TemplateRenderer, run_step,
};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue, json};
use std::sync::Arc;

/// The chat service a node posts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatService {
    /// Slack incoming webhook.
    Slack,
    /// Discord webhook.
    Discord,
}

impl ChatService {
    /// Human-readable name, used in error messages.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Slack => "Slack",
            Self::Discord => "Discord",
        }
    }

    fn step_name(&self) -> &'static str {
        match self {
            Self::Slack => "slack-webhook",
            Self::Discord => "discord-webhook",
        }
    }
}

/// Configuration record of a chat node, as saved by the editor.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ChatNodeData {
    variable_name: Option<String>,
    webhook_url: Option<String>,
    content: Option<String>,
    username: Option<String>,
}

/// Executor for Slack and Discord post nodes.
pub struct ChatPostExecutor {
    service: ChatService,
    poster: Arc<dyn WebhookPoster>,
    renderer: TemplateRenderer,
}

impl ChatPostExecutor {
    /// Creates an executor for the given chat service.
    #[must_use]
    pub fn new(service: ChatService, poster: Arc<dyn WebhookPoster>) -> Self {
        Self {
            service,
            poster,
            renderer: TemplateRenderer::new(),
        }
    }

    fn missing(&self, field: &str) -> NodeError {
        NodeError::non_retriable(format!("{} node: {field} is missing", self.service.label()))
    }
}

#[async_trait]
impl NodeExecutor for ChatPostExecutor {
    async fn execute(
        &self,
        invocation: ExecutorInvocation<'_>,
    ) -> Result<ExecutionContext, NodeError> {
        let config: ChatNodeData = serde_json::from_value(invocation.data.clone()).map_err(|e| {
            NodeError::non_retriable(format!(
                "{} node: invalid configuration: {e}",
                self.service.label()
            ))
        })?;

        let variable_name = config
            .variable_name
            .filter(|s| !s.is_empty())
            .ok_or_else(|| self.missing("variable name"))?;
        let webhook_url = config
            .webhook_url
            .filter(|s| !s.is_empty())
            .ok_or_else(|| self.missing("webhook URL"))?;
        let content_template = config
            .content
            .filter(|s| !s.is_empty())
            .ok_or_else(|| self.missing("content"))?;

        let content = self.renderer.render(&content_template, &invocation.context)?;

        let mut payload = Map::new();
        payload.insert("content".to_string(), JsonValue::String(content.clone()));
        if let Some(username_template) = config.username.filter(|s| !s.is_empty()) {
            let username = self
                .renderer
                .render(&username_template, &invocation.context)?;
            payload.insert("username".to_string(), JsonValue::String(username));
        }
        let payload = JsonValue::Object(payload);

        let poster = Arc::clone(&self.poster);
        run_step(invocation.step, self.service.step_name(), move || {
            async move {
                poster
                    .post_json(&webhook_url, &payload)
                    .await
                    .map_err(NodeError::from)
            }
        })
        .await?;

        Ok(invocation
            .context
            .with_output(&variable_name, json!({"messageContent": content})))
    }
}
