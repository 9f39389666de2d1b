//! Outbound HTTP seams for executors.
//!
//! Chat and HTTP-request nodes reach the network through these traits so
//! tests can substitute recording doubles. The reqwest implementation
//! classifies failures for the durable layer: client errors are permanent
//! (a retried webhook post with a bad URL will fail the same way), server
//! and transport errors are transient.

use async_trait::async_trait;
use flowline_workflow::NodeError;
use serde_json::Value as JsonValue;
use std::fmt;

/// An outbound HTTP call failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpCallError {
    /// Description of the failure.
    pub message: String,
    /// Whether retrying the call could reasonably succeed.
    pub retriable: bool,
}

impl HttpCallError {
    /// Creates a permanent failure.
    #[must_use]
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retriable: false,
        }
    }

    /// Creates a transient failure.
    #[must_use]
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retriable: true,
        }
    }

    fn from_status(status: u16, message: String) -> Self {
        // 408/429 are throttling, not rejection.
        let retriable = !(400..500).contains(&status) || matches!(status, 408 | 429);
        Self { message, retriable }
    }
}

impl fmt::Display for HttpCallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http call failed: {}", self.message)
    }
}

impl std::error::Error for HttpCallError {}

impl From<HttpCallError> for NodeError {
    fn from(e: HttpCallError) -> Self {
        if e.retriable {
            Self::retriable(e.to_string())
        } else {
            Self::non_retriable(e.to_string())
        }
    }
}

/// Posts a JSON payload to a webhook URL.
#[async_trait]
pub trait WebhookPoster: Send + Sync {
    /// Posts the body to the URL, expecting a success status.
    async fn post_json(&self, url: &str, body: &JsonValue) -> Result<(), HttpCallError>;
}

/// The response of a generic HTTP fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body, or the raw text wrapped in a JSON string.
    pub data: JsonValue,
}

/// Performs a generic HTTP request.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Executes the request and returns status plus body.
    async fn fetch(
        &self,
        method: &str,
        url: &str,
        body: Option<&JsonValue>,
    ) -> Result<FetchedResponse, HttpCallError>;
}

/// Reqwest-backed implementation of both outbound seams.
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Creates a client over an existing reqwest client.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WebhookPoster for ReqwestHttpClient {
    async fn post_json(&self, url: &str, body: &JsonValue) -> Result<(), HttpCallError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| HttpCallError::transient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(HttpCallError::from_status(
                status.as_u16(),
                format!("{status}: {text}"),
            ));
        }

        tracing::debug!(url, "webhook post delivered");
        Ok(())
    }
}

#[async_trait]
impl HttpFetcher for ReqwestHttpClient {
    async fn fetch(
        &self,
        method: &str,
        url: &str,
        body: Option<&JsonValue>,
    ) -> Result<FetchedResponse, HttpCallError> {
        let method = reqwest::Method::from_bytes(method.to_uppercase().as_bytes())
            .map_err(|_| HttpCallError::permanent(format!("invalid HTTP method: {method}")))?;

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| HttpCallError::transient(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| HttpCallError::transient(e.to_string()))?;

        let data = serde_json::from_str(&text).unwrap_or(JsonValue::String(text));
        Ok(FetchedResponse { status, data })
    }
}
