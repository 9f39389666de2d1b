//! Connections between workflow nodes.
//!
//! A connection is a directed dependency: the source node must finish before
//! the target node may run. Multiple connections may share an endpoint
//! (fan-in/fan-out).

use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// A directed connection between two nodes in one workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// The node that must execute first.
    pub from_node_id: NodeId,
    /// The node that depends on the source's output.
    pub to_node_id: NodeId,
}

impl Connection {
    /// Creates a new connection.
    #[must_use]
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            from_node_id: from.into(),
            to_node_id: to.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_serde_roundtrip() {
        let connection = Connection::new("a", "b");
        let json = serde_json::to_string(&connection).expect("serialize");
        let parsed: Connection = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(connection, parsed);
    }
}
