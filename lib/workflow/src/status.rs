//! Per-node status broadcasting.
//!
//! Each node kind owns a dedicated channel with a single `status` topic
//! carrying `{node_id, status}` events. Publishing is fire-and-forget
//! telemetry: it is awaited for ordering but never retried, and a publish
//! failure must never mask the underlying node outcome.
//!
//! Delivery to subscribers is at-least-once and possibly reordered, so
//! consumers reconcile with last-writer-wins by event timestamp
//! (see [`latest_status`]).

use crate::error::PublishError;
use crate::node::NodeId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// The topic every status channel publishes on.
pub const STATUS_TOPIC: &str = "status";

/// Execution status of a single node, as shown to subscribers.
///
/// Subscribers also know an initial unset state before the first event for
/// a node arrives; that state is never published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// The node is executing.
    Loading,
    /// The node finished successfully.
    Success,
    /// The node failed.
    Error,
}

/// A status event for one node.
///
/// Transient: published, never stored. The timestamp orders events for
/// consumers that receive them out of order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    /// The node this event describes.
    pub node_id: NodeId,
    /// The status being reported.
    pub status: NodeStatus,
    /// When the event was published.
    pub timestamp: DateTime<Utc>,
}

impl StatusEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn now(node_id: NodeId, status: NodeStatus) -> Self {
        Self {
            node_id,
            status,
            timestamp: Utc::now(),
        }
    }
}

/// The status publish transport.
#[async_trait]
pub trait StatusPublisher: Send + Sync {
    /// Publishes one event to a channel topic.
    async fn publish(
        &self,
        channel: &str,
        topic: &str,
        event: StatusEvent,
    ) -> Result<(), PublishError>;
}

/// A publisher bound to one node kind's channel.
///
/// `publish` is best-effort: transport failures are logged and swallowed so
/// telemetry can never change a run's control flow.
pub struct StatusHandle<'a> {
    publisher: &'a dyn StatusPublisher,
    channel: &'static str,
}

impl<'a> StatusHandle<'a> {
    /// Creates a handle for the given channel.
    #[must_use]
    pub fn new(publisher: &'a dyn StatusPublisher, channel: &'static str) -> Self {
        Self { publisher, channel }
    }

    /// Returns the channel this handle publishes to.
    #[must_use]
    pub fn channel(&self) -> &'static str {
        self.channel
    }

    /// Publishes a status for a node, swallowing transport failures.
    pub async fn publish(&self, node_id: &NodeId, status: NodeStatus) {
        let event = StatusEvent::now(node_id.clone(), status);
        if let Err(e) = self
            .publisher
            .publish(self.channel, STATUS_TOPIC, event)
            .await
        {
            tracing::warn!(
                channel = self.channel,
                node_id = %node_id,
                error = %e,
                "status publish failed"
            );
        }
    }
}

/// Reconciles a node's current status from received events.
///
/// Last-writer-wins by timestamp: delivery may be at-least-once and
/// reordered, so the newest event for the node decides. Returns `None` when
/// no event mentions the node (the subscriber's initial unset state).
#[must_use]
pub fn latest_status(events: &[StatusEvent], node_id: &NodeId) -> Option<NodeStatus> {
    events
        .iter()
        .filter(|event| &event.node_id == node_id)
        .max_by_key(|event| event.timestamp)
        .map(|event| event.status)
}

/// In-memory publisher recording every event, for tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryStatusPublisher {
    events: Mutex<Vec<(String, StatusEvent)>>,
}

impl MemoryStatusPublisher {
    /// Creates an empty publisher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded `(channel, event)` pairs in publish order.
    pub async fn events(&self) -> Vec<(String, StatusEvent)> {
        self.events.lock().await.clone()
    }

    /// Returns the recorded statuses for one node, in publish order.
    pub async fn statuses_for(&self, node_id: &NodeId) -> Vec<NodeStatus> {
        self.events
            .lock()
            .await
            .iter()
            .filter(|(_, event)| &event.node_id == node_id)
            .map(|(_, event)| event.status)
            .collect()
    }
}

#[async_trait]
impl StatusPublisher for MemoryStatusPublisher {
    async fn publish(
        &self,
        channel: &str,
        _topic: &str,
        event: StatusEvent,
    ) -> Result<(), PublishError> {
        self.events.lock().await.push((channel.to_string(), event));
        Ok(())
    }
}

/// NATS-backed status publisher.
///
/// Events go to `status.<channel>.<topic>` as JSON. Core NATS (not
/// JetStream) is deliberate: status events are transient and losing one is
/// acceptable, matching the fire-and-forget contract.
pub struct NatsStatusPublisher {
    client: async_nats::Client,
}

impl NatsStatusPublisher {
    /// Creates a publisher over an existing NATS client.
    #[must_use]
    pub fn new(client: async_nats::Client) -> Self {
        Self { client }
    }

    fn subject(channel: &str, topic: &str) -> String {
        format!("status.{channel}.{topic}")
    }
}

#[async_trait]
impl StatusPublisher for NatsStatusPublisher {
    async fn publish(
        &self,
        channel: &str,
        topic: &str,
        event: StatusEvent,
    ) -> Result<(), PublishError> {
        let bytes = serde_json::to_vec(&event).map_err(|e| PublishError {
            message: format!("failed to serialize status event: {e}"),
        })?;

        self.client
            .publish(Self::subject(channel, topic), bytes.into())
            .await
            .map_err(|e| PublishError {
                message: e.to_string(),
            })
    }
}
