//! Workflow definition types.
//!
//! A workflow owns a set of nodes, the connections between them, and its
//! trigger configuration (webhook secrets). Definitions are created and
//! edited by the graph editor; the engine reads them immutably once an
//! execution starts.

use crate::connection::Connection;
use crate::error::{DefinitionError, StoreError};
use crate::node::Node;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flowline_core::{UserId, WorkflowId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::HashSet;
use tokio::sync::RwLock;

/// A complete workflow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// Unique identifier for this workflow.
    pub id: WorkflowId,
    /// The user who owns this workflow.
    pub user_id: UserId,
    /// Human-readable name.
    pub name: String,
    /// The workflow's nodes, in editor insertion order.
    pub nodes: Vec<Node>,
    /// Directed connections between nodes.
    pub connections: Vec<Connection>,
    /// Secret for HMAC verification of generic webhook triggers.
    pub webhook_secret: Option<String>,
    /// Stripe signing secret for payment webhook triggers.
    pub stripe_webhook_secret: Option<String>,
    /// When this workflow was created.
    pub created_at: DateTime<Utc>,
    /// When this workflow was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    /// Creates an empty workflow owned by the given user.
    #[must_use]
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: WorkflowId::new(),
            user_id,
            name: name.into(),
            nodes: Vec::new(),
            connections: Vec::new(),
            webhook_secret: None,
            stripe_webhook_secret: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Adds a node.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
        self.updated_at = Utc::now();
    }

    /// Adds a connection.
    pub fn add_connection(&mut self, connection: Connection) {
        self.connections.push(connection);
        self.updated_at = Utc::now();
    }

    /// Returns the node with the given ID, if any.
    #[must_use]
    pub fn node(&self, node_id: &crate::node::NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == node_id)
    }

    /// Validates the definition invariants.
    ///
    /// - Node IDs are unique within the workflow.
    /// - Every connection endpoint references an existing node.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !seen.insert(&node.id) {
                return Err(DefinitionError::DuplicateNodeId {
                    node_id: node.id.clone(),
                });
            }
        }

        for connection in &self.connections {
            for endpoint in [&connection.from_node_id, &connection.to_node_id] {
                if !seen.contains(endpoint) {
                    return Err(DefinitionError::UnknownEndpoint {
                        node_id: endpoint.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Read-only access to workflow definitions.
///
/// The relational schema behind this is an external collaborator; the
/// engine only ever fetches a workflow by ID.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Fetches a workflow by ID.
    async fn get(&self, workflow_id: WorkflowId) -> Result<Option<Workflow>, StoreError>;
}

/// In-memory workflow store for tests and the local server runtime.
#[derive(Debug, Default)]
pub struct MemoryWorkflowStore {
    workflows: RwLock<HashMap<WorkflowId, Workflow>>,
}

impl MemoryWorkflowStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a workflow.
    pub async fn insert(&self, workflow: Workflow) {
        self.workflows.write().await.insert(workflow.id, workflow);
    }
}

#[async_trait]
impl WorkflowStore for MemoryWorkflowStore {
    async fn get(&self, workflow_id: WorkflowId) -> Result<Option<Workflow>, StoreError> {
        Ok(self.workflows.read().await.get(&workflow_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;
    use serde_json::json;

    fn workflow_with_nodes() -> Workflow {
        let mut workflow = Workflow::new(UserId::new(), "Test");
        workflow.add_node(Node::new("1", NodeKind::ManualTrigger, json!({})));
        workflow.add_node(Node::new(
            "2",
            NodeKind::Slack,
            json!({"variableName": "n1", "content": "hi"}),
        ));
        workflow.add_connection(Connection::new("1", "2"));
        workflow
    }

    #[test]
    fn valid_workflow_passes_validation() {
        assert!(workflow_with_nodes().validate().is_ok());
    }

    #[test]
    fn duplicate_node_ids_are_rejected() {
        let mut workflow = workflow_with_nodes();
        workflow.add_node(Node::new("1", NodeKind::Discord, json!({})));

        match workflow.validate() {
            Err(DefinitionError::DuplicateNodeId { node_id }) => {
                assert_eq!(node_id.as_str(), "1");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn dangling_connection_is_rejected() {
        let mut workflow = workflow_with_nodes();
        workflow.add_connection(Connection::new("2", "ghost"));

        match workflow.validate() {
            Err(DefinitionError::UnknownEndpoint { node_id }) => {
                assert_eq!(node_id.as_str(), "ghost");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn memory_store_roundtrip() {
        let store = MemoryWorkflowStore::new();
        let workflow = workflow_with_nodes();
        let id = workflow.id;

        store.insert(workflow.clone()).await;

        let fetched = store.get(id).await.expect("store").expect("workflow");
        assert_eq!(fetched, workflow);
        assert!(store.get(WorkflowId::new()).await.expect("store").is_none());
    }

    #[test]
    fn workflow_serde_roundtrip() {
        let workflow = workflow_with_nodes();
        let json = serde_json::to_string(&workflow).expect("serialize");
        let parsed: Workflow = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(workflow, parsed);
    }
}
