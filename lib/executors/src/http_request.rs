//! Generic HTTP request executor.
//!
//! Fetches an endpoint (with templated URL and body) and binds the response
//! under the node's output variable as `{"httpResponse": {status, data}}`,
//! so downstream templates can reach into the payload with the `nested`
//! helper.

use crate::http::HttpFetcher;
use async_trait::async_trait;
use flowline_workflow::{
    ExecutionContext, ExecutorInvocation, NodeError, NodeExecutor, TemplateRenderer, run_step,
};
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;

/// Configuration record of an HTTP request node, as saved by the editor.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct HttpRequestNodeData {
    variable_name: Option<String>,
    endpoint: Option<String>,
    method: Option<String>,
    body: Option<String>,
}

/// Executor for HTTP request nodes.
pub struct HttpRequestExecutor {
    fetcher: Arc<dyn HttpFetcher>,
    renderer: TemplateRenderer,
}

impl HttpRequestExecutor {
    /// Creates an executor over the given HTTP seam.
    #[must_use]
    pub fn new(fetcher: Arc<dyn HttpFetcher>) -> Self {
        Self {
            fetcher,
            renderer: TemplateRenderer::new(),
        }
    }

    fn missing(field: &str) -> NodeError {
        NodeError::non_retriable(format!("HTTP request node: {field} is missing"))
    }
}

#[async_trait]
impl NodeExecutor for HttpRequestExecutor {
    async fn execute(
        &self,
        invocation: ExecutorInvocation<'_>,
    ) -> Result<ExecutionContext, NodeError> {
        let config: HttpRequestNodeData = serde_json::from_value(invocation.data.clone())
            .map_err(|e| {
                NodeError::non_retriable(format!("HTTP request node: invalid configuration: {e}"))
            })?;

        let variable_name = config
            .variable_name
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Self::missing("variable name"))?;
        let endpoint_template = config
            .endpoint
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Self::missing("endpoint"))?;

        let endpoint = self
            .renderer
            .render(&endpoint_template, &invocation.context)?;
        let method = config
            .method
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "GET".to_string());

        // A rendered body that parses as JSON is sent structurally;
        // anything else goes as a JSON string.
        let body = match config.body.filter(|b| !b.is_empty()) {
            Some(template) => {
                let rendered = self.renderer.render(&template, &invocation.context)?;
                Some(
                    serde_json::from_str(&rendered).unwrap_or(JsonValue::String(rendered)),
                )
            }
            None => None,
        };

        let fetcher = Arc::clone(&self.fetcher);
        let response = run_step(invocation.step, "http-request", move || {
            async move {
                let response = fetcher
                    .fetch(&method, &endpoint, body.as_ref())
                    .await
                    .map_err(NodeError::from)?;
                Ok(json!({"status": response.status, "data": response.data}))
            }
        })
        .await?;

        Ok(invocation
            .context
            .with_output(&variable_name, json!({"httpResponse": response})))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{FetchedResponse, HttpCallError};
    use flowline_core::UserId;
    use flowline_workflow::{MemoStepRunner, MemoryStatusPublisher, NodeId, NodeKind, StatusHandle};
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingFetcher {
        last_request: Mutex<Option<(String, String, Option<JsonValue>)>>,
    }

    #[async_trait]
    impl HttpFetcher for RecordingFetcher {
        async fn fetch(
            &self,
            method: &str,
            url: &str,
            body: Option<&JsonValue>,
        ) -> Result<FetchedResponse, HttpCallError> {
            *self.last_request.lock().await =
                Some((method.to_string(), url.to_string(), body.cloned()));
            Ok(FetchedResponse {
                status: 200,
                data: json!({"data": {"name": "Acme"}}),
            })
        }
    }

    async fn execute(
        fetcher: Arc<RecordingFetcher>,
        data: JsonValue,
        context: ExecutionContext,
    ) -> Result<ExecutionContext, NodeError> {
        let executor = HttpRequestExecutor::new(fetcher as Arc<dyn HttpFetcher>);
        let publisher = MemoryStatusPublisher::new();
        let status = StatusHandle::new(&publisher, NodeKind::HttpRequest.channel());
        let step = MemoStepRunner::new();
        let node_id = NodeId::from("h");
        executor
            .execute(ExecutorInvocation {
                node_id: &node_id,
                data: &data,
                user_id: UserId::new(),
                context,
                step: &step,
                status: &status,
            })
            .await
    }

    #[tokio::test]
    async fn fetches_templated_endpoint_and_binds_response() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let context = ExecutionContext::seed(json!({"stripe": {"customerId": "cus_42"}}));

        let result = execute(
            Arc::clone(&fetcher),
            json!({
                "variableName": "customerData",
                "endpoint": "https://api.example.com/customers/{{stripe.customerId}}",
                "method": "GET"
            }),
            context,
        )
        .await
        .expect("execute");

        let request = fetcher.last_request.lock().await.clone().expect("request");
        assert_eq!(request.0, "GET");
        assert_eq!(request.1, "https://api.example.com/customers/cus_42");
        assert!(request.2.is_none());

        assert_eq!(
            result.get("customerData"),
            Some(&json!({
                "httpResponse": {"status": 200, "data": {"data": {"name": "Acme"}}}
            }))
        );
    }

    #[tokio::test]
    async fn json_body_is_sent_structurally() {
        let fetcher = Arc::new(RecordingFetcher::default());
        execute(
            Arc::clone(&fetcher),
            json!({
                "variableName": "created",
                "endpoint": "https://api.example.com/items",
                "method": "POST",
                "body": "{\"name\": \"{{trigger.name}}\"}"
            }),
            ExecutionContext::seed(json!({"trigger": {"name": "Widget"}})),
        )
        .await
        .expect("execute");

        let request = fetcher.last_request.lock().await.clone().expect("request");
        assert_eq!(request.2, Some(json!({"name": "Widget"})));
    }

    #[tokio::test]
    async fn missing_endpoint_fails_fast() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let result = execute(
            Arc::clone(&fetcher),
            json!({"variableName": "x"}),
            ExecutionContext::new(),
        )
        .await;

        match result {
            Err(e) => {
                assert!(!e.is_retriable());
                assert!(e.to_string().contains("endpoint is missing"));
            }
            Ok(_) => panic!("expected failure"),
        }
        assert!(fetcher.last_request.lock().await.is_none());
    }
}
