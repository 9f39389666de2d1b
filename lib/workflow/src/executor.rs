//! The node executor contract and registry.
//!
//! Every node kind implements one executor with a uniform signature: given
//! the node's configuration, the acting user, the accumulated context, a
//! durable step handle, and a status handle, it returns the new context
//! (the old context extended with one entry under the node's configured
//! output variable) or an error.
//!
//! The registry maps node kinds to executors. Adding a node kind means
//! adding one executor and one registry entry; the runner never changes.

use crate::context::ExecutionContext;
use crate::error::NodeError;
use crate::node::{NodeId, NodeKind};
use crate::status::StatusHandle;
use crate::step::StepRunner;
use async_trait::async_trait;
use flowline_core::UserId;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;

/// Everything an executor receives for one node invocation.
pub struct ExecutorInvocation<'a> {
    /// The node being executed.
    pub node_id: &'a NodeId,
    /// The node's kind-specific configuration record.
    pub data: &'a JsonValue,
    /// The user the workflow belongs to; scopes credential resolution.
    pub user_id: UserId,
    /// The accumulated context, owned by this invocation.
    pub context: ExecutionContext,
    /// Durable step handle, already scoped to this node.
    pub step: &'a dyn StepRunner,
    /// Status handle bound to this node kind's channel.
    ///
    /// The runner publishes the guaranteed `loading`/terminal pair around
    /// every invocation; executors may use this handle for intermediate
    /// signals but are not responsible for the terminal events.
    pub status: &'a StatusHandle<'a>,
}

/// A node executor.
#[async_trait]
pub trait NodeExecutor: Send + Sync {
    /// Executes one node.
    ///
    /// The returned context must be a superset of the invocation's context:
    /// downstream nodes need every prior variable.
    ///
    /// # Errors
    ///
    /// Missing required configuration fails with a non-retriable error
    /// before any external call; transient external failures are retriable.
    async fn execute(
        &self,
        invocation: ExecutorInvocation<'_>,
    ) -> Result<ExecutionContext, NodeError>;
}

/// Maps node kinds to their executors.
#[derive(Default)]
pub struct ExecutorRegistry {
    executors: HashMap<NodeKind, Arc<dyn NodeExecutor>>,
}

impl ExecutorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an executor for a node kind, replacing any previous entry.
    pub fn register(&mut self, kind: NodeKind, executor: Arc<dyn NodeExecutor>) {
        self.executors.insert(kind, executor);
    }

    /// Returns the executor for a node kind, if registered.
    #[must_use]
    pub fn get(&self, kind: NodeKind) -> Option<&Arc<dyn NodeExecutor>> {
        self.executors.get(&kind)
    }

    /// Returns true if a node kind has a registered executor.
    #[must_use]
    pub fn contains(&self, kind: NodeKind) -> bool {
        self.executors.contains_key(&kind)
    }

    /// Returns the number of registered executors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.executors.len()
    }

    /// Returns true if no executors are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PassthroughExecutor;

    #[async_trait]
    impl NodeExecutor for PassthroughExecutor {
        async fn execute(
            &self,
            invocation: ExecutorInvocation<'_>,
        ) -> Result<ExecutionContext, NodeError> {
            Ok(invocation.context)
        }
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = ExecutorRegistry::new();
        assert!(registry.is_empty());

        registry.register(NodeKind::ManualTrigger, Arc::new(PassthroughExecutor));

        assert!(registry.contains(NodeKind::ManualTrigger));
        assert!(registry.get(NodeKind::ManualTrigger).is_some());
        assert!(registry.get(NodeKind::Slack).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn register_replaces_previous_entry() {
        let mut registry = ExecutorRegistry::new();
        registry.register(NodeKind::Slack, Arc::new(PassthroughExecutor));
        registry.register(NodeKind::Slack, Arc::new(PassthroughExecutor));
        assert_eq!(registry.len(), 1);
    }
}
