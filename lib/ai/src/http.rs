//! HTTP completion backend.
//!
//! One reqwest client serves all three providers; only the request shape
//! and the location of the generated text differ per provider.

use crate::backend::{CompletionBackend, CompletionRequest, CompletionResponse, Provider};
use crate::error::CompletionError;
use async_trait::async_trait;
use serde_json::{Value as JsonValue, json};

/// Reqwest-based completion backend.
pub struct HttpCompletionBackend {
    client: reqwest::Client,
    base_url_override: Option<String>,
}

impl HttpCompletionBackend {
    /// Creates a backend with the given client.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url_override: None,
        }
    }

    /// Overrides every provider's base URL; for tests and proxies.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    fn base_url(&self, provider: Provider) -> &str {
        self.base_url_override
            .as_deref()
            .unwrap_or_else(|| provider.base_url())
    }

    fn build(&self, request: &CompletionRequest) -> reqwest::RequestBuilder {
        let base = self.base_url(request.provider);
        match request.provider {
            Provider::OpenAi => self
                .client
                .post(format!("{base}/v1/chat/completions"))
                .bearer_auth(&request.api_key)
                .json(&json!({
                    "model": request.model,
                    "messages": [
                        {"role": "system", "content": request.system},
                        {"role": "user", "content": request.prompt},
                    ],
                })),
            Provider::Anthropic => self
                .client
                .post(format!("{base}/v1/messages"))
                .header("x-api-key", &request.api_key)
                .header("anthropic-version", "2023-06-01")
                .json(&json!({
                    "model": request.model,
                    "max_tokens": 1024,
                    "system": request.system,
                    "messages": [
                        {"role": "user", "content": request.prompt},
                    ],
                })),
            Provider::Gemini => self
                .client
                .post(format!(
                    "{base}/v1beta/models/{}:generateContent",
                    request.model
                ))
                .header("x-goog-api-key", &request.api_key)
                .json(&json!({
                    "system_instruction": {"parts": [{"text": request.system}]},
                    "contents": [
                        {"role": "user", "parts": [{"text": request.prompt}]},
                    ],
                })),
        }
    }

    /// Where the generated text lives in each provider's response body.
    fn text_pointer(provider: Provider) -> &'static str {
        match provider {
            Provider::OpenAi => "/choices/0/message/content",
            Provider::Anthropic => "/content/0/text",
            Provider::Gemini => "/candidates/0/content/parts/0/text",
        }
    }

    fn extract_text(provider: Provider, body: &JsonValue) -> Result<String, CompletionError> {
        body.pointer(Self::text_pointer(provider))
            .and_then(JsonValue::as_str)
            .map(str::to_string)
            .ok_or_else(|| CompletionError::InvalidResponse {
                message: format!("{} response carried no generated text", provider.label()),
            })
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionBackend {
    async fn generate(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        let response = self
            .build(request)
            .send()
            .await
            .map_err(|e| CompletionError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: JsonValue = response
            .json()
            .await
            .map_err(|e| CompletionError::InvalidResponse {
                message: e.to_string(),
            })?;

        let text = Self::extract_text(request.provider, &body)?;
        Ok(CompletionResponse { text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_openai_text() {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "hello"}}]
        });
        let text = HttpCompletionBackend::extract_text(Provider::OpenAi, &body).expect("text");
        assert_eq!(text, "hello");
    }

    #[test]
    fn extracts_anthropic_text() {
        let body = json!({
            "content": [{"type": "text", "text": "hello"}]
        });
        let text = HttpCompletionBackend::extract_text(Provider::Anthropic, &body).expect("text");
        assert_eq!(text, "hello");
    }

    #[test]
    fn extracts_gemini_text() {
        let body = json!({
            "candidates": [{"content": {"parts": [{"text": "hello"}]}}]
        });
        let text = HttpCompletionBackend::extract_text(Provider::Gemini, &body).expect("text");
        assert_eq!(text, "hello");
    }

    #[test]
    fn missing_text_is_invalid_response() {
        let body = json!({"choices": []});
        let result = HttpCompletionBackend::extract_text(Provider::OpenAi, &body);
        assert!(matches!(
            result,
            Err(CompletionError::InvalidResponse { .. })
        ));
    }
}
