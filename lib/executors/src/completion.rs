//! Completion node executors.
//!
//! One executor serves every completion provider; the provider only changes
//! the default model, the step name, and the error-message prefix.
//!
//! Invocation shape:
//! 1. Validate required configuration (output variable, user prompt,
//!    credential reference), non-retriably, before any external call.
//! 2. Render the system and user prompts against the context.
//! 3. Resolve the credential user-scoped inside the `get-credential` step.
//! 4. Call the completion backend inside the `<provider>-generate-text`
//!    step.
//! 5. Bind `{variableName: {"text": ...}}` into the context.

use async_trait::async_trait;
use flowline_ai::{CompletionBackend, CompletionRequest, Provider};
use flowline_core::CredentialId;
use flowline_credentials::CredentialStore;
use flowline_workflow::{
    ExecutionContext, ExecutorInvocation, NodeError, NodeExecutor, TemplateRenderer, run_step,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant";

/// Configuration record of a completion node, as saved by the editor.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CompletionNodeData {
    variable_name: Option<String>,
    credential_id: Option<CredentialId>,
    model: Option<String>,
    system_prompt: Option<String>,
    user_prompt: Option<String>,
}

/// Executor for OpenAI, Anthropic, and Gemini completion nodes.
pub struct CompletionExecutor {
    provider: Provider,
    backend: Arc<dyn CompletionBackend>,
    credentials: Arc<dyn CredentialStore>,
    renderer: TemplateRenderer,
}

impl CompletionExecutor {
    /// Creates an executor for the given provider.
    #[must_use]
    pub fn new(
        provider: Provider,
        backend: Arc<dyn CompletionBackend>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            provider,
            backend,
            credentials,
            renderer: TemplateRenderer::new(),
        }
    }

    fn generate_step_name(&self) -> &'static str {
        match self.provider {
            Provider::OpenAi => "openai-generate-text",
            Provider::Anthropic => "anthropic-generate-text",
            Provider::Gemini => "gemini-generate-text",
        }
    }

    fn missing(&self, field: &str) -> NodeError {
        NodeError::non_retriable(format!("{} node: {field} is missing", self.provider.label()))
    }
}

#[async_trait]
impl NodeExecutor for CompletionExecutor {
    async fn execute(
        &self,
        invocation: ExecutorInvocation<'_>,
    ) -> Result<ExecutionContext, NodeError> {
        let config: CompletionNodeData =
            serde_json::from_value(invocation.data.clone()).map_err(|e| {
                NodeError::non_retriable(format!(
                    "{} node: invalid configuration: {e}",
                    self.provider.label()
                ))
            })?;

        let variable_name = config
            .variable_name
            .filter(|s| !s.is_empty())
            .ok_or_else(|| self.missing("variable name"))?;
        let user_prompt_template = config
            .user_prompt
            .filter(|s| !s.is_empty())
            .ok_or_else(|| self.missing("user prompt"))?;
        let credential_id = config
            .credential_id
            .ok_or_else(|| self.missing("credential"))?;

        let system = match config.system_prompt.as_deref() {
            Some(template) if !template.is_empty() => {
                self.renderer.render(template, &invocation.context)?
            }
            _ => DEFAULT_SYSTEM_PROMPT.to_string(),
        };
        let prompt = self
            .renderer
            .render(&user_prompt_template, &invocation.context)?;

        let credentials = Arc::clone(&self.credentials);
        let user_id = invocation.user_id;
        let credential = run_step(invocation.step, "get-credential", move || async move {
            credentials
                .find_by_id(credential_id, user_id)
                .await
                .map_err(|e| NodeError::retriable(e.to_string()))
        })
        .await?
        .ok_or(NodeError::CredentialNotFound { credential_id })?;

        let request = CompletionRequest {
            provider: self.provider,
            api_key: credential.value,
            model: config
                .model
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| self.provider.default_model().to_string()),
            system,
            prompt,
        };

        let backend = Arc::clone(&self.backend);
        let response = run_step(invocation.step, self.generate_step_name(), move || {
            async move {
                backend.generate(&request).await.map_err(|e| {
                    if e.is_transient() {
                        NodeError::retriable(e.to_string())
                    } else {
                        NodeError::non_retriable(e.to_string())
                    }
                })
            }
        })
        .await?;

        Ok(invocation
            .context
            .with_output(&variable_name, json!({"text": response.text})))
    }
}
