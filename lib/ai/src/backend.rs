//! Completion backend abstraction.
//!
//! Provides a unified interface over the supported model providers. Each
//! completion node resolves its own credential and model; the backend only
//! turns a request into generated text.

use crate::error::CompletionError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The supported model providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// OpenAI chat completions.
    #[serde(rename = "openai")]
    OpenAi,
    /// Anthropic messages.
    Anthropic,
    /// Google Gemini generateContent.
    Gemini,
}

impl Provider {
    /// Human-readable provider name, used in error messages.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Gemini => "Gemini",
        }
    }

    /// The model used when a node does not configure one.
    #[must_use]
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Anthropic => "claude-3-5-haiku-20241022",
            Self::Gemini => "gemini-2.0-flash",
        }
    }

    /// The API base URL for this provider.
    #[must_use]
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com",
            Self::Anthropic => "https://api.anthropic.com",
            Self::Gemini => "https://generativelanguage.googleapis.com",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single-shot completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The provider to call.
    pub provider: Provider,
    /// Decrypted API key for the provider.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// System prompt.
    pub system: String,
    /// User prompt.
    pub prompt: String,
}

/// The generated completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The generated text.
    pub text: String,
}

/// Trait for completion backends.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Generates a completion for the given request.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider call fails; see
    /// [`CompletionError::is_transient`] for retry classification.
    async fn generate(&self, request: &CompletionRequest)
    -> Result<CompletionResponse, CompletionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_defaults() {
        assert_eq!(Provider::OpenAi.default_model(), "gpt-4o-mini");
        assert_eq!(Provider::Anthropic.default_model(), "claude-3-5-haiku-20241022");
        assert_eq!(Provider::Gemini.default_model(), "gemini-2.0-flash");
    }

    #[test]
    fn provider_serde_tags() {
        let json = serde_json::to_string(&Provider::OpenAi).expect("serialize");
        assert_eq!(json, "\"openai\"");
        let parsed: Provider = serde_json::from_str("\"gemini\"").expect("deserialize");
        assert_eq!(parsed, Provider::Gemini);
    }
}
