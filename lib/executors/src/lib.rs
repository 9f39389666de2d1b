//! Node executors for the flowline workflow engine.
//!
//! One executor per node kind, all following the same shape: validate the
//! node's configuration (fail fast, non-retriably, before any external
//! call), render user-authored text fields against the context, perform the
//! external effect inside one named durable step, and bind the output under
//! the node's configured variable name.

pub mod chat;
pub mod completion;
pub mod http;
pub mod http_request;
pub mod trigger;

pub use chat::{ChatPostExecutor, ChatService};
pub use completion::CompletionExecutor;
pub use http::{FetchedResponse, HttpCallError, HttpFetcher, ReqwestHttpClient, WebhookPoster};
pub use http_request::HttpRequestExecutor;
pub use trigger::TriggerExecutor;

use flowline_ai::{CompletionBackend, Provider};
use flowline_credentials::CredentialStore;
use flowline_workflow::{ExecutorRegistry, NodeKind};
use std::sync::Arc;

/// External collaborators the default executor set needs.
pub struct ExecutorDeps {
    /// User-scoped credential lookup.
    pub credentials: Arc<dyn CredentialStore>,
    /// Completion backend for the model providers.
    pub completions: Arc<dyn CompletionBackend>,
    /// Outbound webhook poster for chat nodes.
    pub poster: Arc<dyn WebhookPoster>,
    /// Outbound HTTP client for request nodes.
    pub fetcher: Arc<dyn HttpFetcher>,
}

/// Builds the registry covering every node kind.
#[must_use]
pub fn default_registry(deps: &ExecutorDeps) -> ExecutorRegistry {
    let mut registry = ExecutorRegistry::new();

    registry.register(NodeKind::ManualTrigger, Arc::new(TriggerExecutor::manual()));
    registry.register(
        NodeKind::GoogleFormTrigger,
        Arc::new(TriggerExecutor::google_form()),
    );
    registry.register(NodeKind::StripeTrigger, Arc::new(TriggerExecutor::stripe()));

    for (kind, provider) in [
        (NodeKind::OpenAi, Provider::OpenAi),
        (NodeKind::Anthropic, Provider::Anthropic),
        (NodeKind::Gemini, Provider::Gemini),
    ] {
        registry.register(
            kind,
            Arc::new(CompletionExecutor::new(
                provider,
                Arc::clone(&deps.completions),
                Arc::clone(&deps.credentials),
            )),
        );
    }

    registry.register(
        NodeKind::Slack,
        Arc::new(ChatPostExecutor::new(
            ChatService::Slack,
            Arc::clone(&deps.poster),
        )),
    );
    registry.register(
        NodeKind::Discord,
        Arc::new(ChatPostExecutor::new(
            ChatService::Discord,
            Arc::clone(&deps.poster),
        )),
    );
    registry.register(
        NodeKind::HttpRequest,
        Arc::new(HttpRequestExecutor::new(Arc::clone(&deps.fetcher))),
    );

    registry
}
