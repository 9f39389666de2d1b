//! Tracing setup and the log-only status publisher.

use async_trait::async_trait;
use flowline_workflow::{PublishError, StatusEvent, StatusPublisher};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes the tracing subscriber from `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Status publisher that logs events instead of broadcasting them.
///
/// Used when no NATS URL is configured; keeps local development observable
/// without a message broker.
pub struct LogStatusPublisher;

#[async_trait]
impl StatusPublisher for LogStatusPublisher {
    async fn publish(
        &self,
        channel: &str,
        topic: &str,
        event: StatusEvent,
    ) -> Result<(), PublishError> {
        tracing::info!(
            channel,
            topic,
            node_id = %event.node_id,
            status = ?event.status,
            "node status"
        );
        Ok(())
    }
}
