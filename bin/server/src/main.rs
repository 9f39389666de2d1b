//! flowline server: webhook ingress plus the local run runtime.

mod config;
mod launch;
mod routes;
mod state;
mod telemetry;

use crate::config::ServerConfig;
use crate::launch::TokioRunLauncher;
use crate::state::AppState;
use crate::telemetry::LogStatusPublisher;
use flowline_ai::HttpCompletionBackend;
use flowline_credentials::{CredentialStore, MemoryCredentialStore};
use flowline_executors::{ExecutorDeps, ReqwestHttpClient, default_registry};
use flowline_ingress::RunLauncher;
use flowline_workflow::{
    MemoryWorkflowStore, NatsStatusPublisher, StatusPublisher, WorkflowRunner, WorkflowStore,
};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    telemetry::init_tracing();

    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    let http_client = reqwest::Client::builder()
        .build()
        .expect("failed to build HTTP client");

    let publisher: Arc<dyn StatusPublisher> = match &config.nats_url {
        Some(url) => {
            let client = async_nats::connect(url.as_str())
                .await
                .expect("failed to connect to NATS");
            tracing::info!(url = %url, "Connected to NATS for status broadcasting");
            Arc::new(NatsStatusPublisher::new(client))
        }
        None => {
            tracing::info!("No NATS URL configured; status events will be logged");
            Arc::new(LogStatusPublisher)
        }
    };

    let workflows = Arc::new(MemoryWorkflowStore::new());
    let credentials = Arc::new(MemoryCredentialStore::new());

    let deps = ExecutorDeps {
        credentials: credentials as Arc<dyn CredentialStore>,
        completions: Arc::new(HttpCompletionBackend::new(http_client.clone())),
        poster: Arc::new(ReqwestHttpClient::new(http_client.clone())),
        fetcher: Arc::new(ReqwestHttpClient::new(http_client)),
    };
    let registry = default_registry(&deps);
    let runner = Arc::new(WorkflowRunner::new(registry, publisher));

    let launcher = Arc::new(TokioRunLauncher::new(
        Arc::clone(&workflows) as Arc<dyn WorkflowStore>,
        runner,
    ));

    let state = AppState {
        workflows: workflows as Arc<dyn WorkflowStore>,
        launcher: launcher as Arc<dyn RunLauncher>,
        stripe_tolerance_seconds: config.stripe_tolerance_seconds,
    };

    let router = routes::router(state);
    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("failed to bind listen address");
    tracing::info!(addr = %config.listen_addr, "flowline server listening");

    axum::serve(listener, router)
        .await
        .expect("server error");
}
