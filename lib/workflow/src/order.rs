//! Execution-order computation for workflow graphs.
//!
//! Produces a total order over a workflow's nodes consistent with every
//! connection: the source of each connection precedes its target. Nodes
//! that participate in no connection are ordinary vertices and appear in
//! the output exactly once, in input order relative to other ties.

use crate::connection::Connection;
use crate::error::OrderError;
use crate::node::{Node, NodeId};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, VecDeque};

/// Computes the execution order for a workflow's nodes.
///
/// - An empty connection set returns the nodes in input order, unchanged.
/// - Ties among independent nodes resolve in first-seen input order, so the
///   result is deterministic for a given input.
///
/// # Errors
///
/// - [`OrderError::UnknownNode`] if a connection endpoint references a node
///   that is not in the node set.
/// - [`OrderError::CyclicWorkflow`] if the connections contain a cycle. This
///   is fatal for the run: execution must not start.
pub fn execution_order(
    nodes: &[Node],
    connections: &[Connection],
) -> Result<Vec<NodeId>, OrderError> {
    // Independent nodes need no ordering guarantee.
    if connections.is_empty() {
        return Ok(nodes.iter().map(|n| n.id.clone()).collect());
    }

    let mut graph: DiGraph<NodeId, ()> = DiGraph::with_capacity(nodes.len(), connections.len());
    let mut indices: HashMap<&NodeId, NodeIndex> = HashMap::with_capacity(nodes.len());

    for node in nodes {
        let index = graph.add_node(node.id.clone());
        indices.insert(&node.id, index);
    }

    for connection in connections {
        let from = *indices
            .get(&connection.from_node_id)
            .ok_or_else(|| OrderError::UnknownNode {
                node_id: connection.from_node_id.clone(),
            })?;
        let to = *indices
            .get(&connection.to_node_id)
            .ok_or_else(|| OrderError::UnknownNode {
                node_id: connection.to_node_id.clone(),
            })?;
        graph.add_edge(from, to, ());
    }

    // Kahn's algorithm with a FIFO queue seeded in insertion order: ties
    // come out in first-seen order, keeping runs reproducible.
    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|index| graph.neighbors_directed(index, Direction::Incoming).count())
        .collect();

    let mut queue: VecDeque<NodeIndex> = graph
        .node_indices()
        .filter(|index| in_degree[index.index()] == 0)
        .collect();

    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(index) = queue.pop_front() {
        order.push(graph[index].clone());
        // petgraph iterates neighbors in reverse edge-insertion order;
        // sort newly-ready nodes by index to keep ties in input order.
        let mut ready = Vec::new();
        for successor in graph.neighbors_directed(index, Direction::Outgoing) {
            in_degree[successor.index()] -= 1;
            if in_degree[successor.index()] == 0 {
                ready.push(successor);
            }
        }
        ready.sort_unstable();
        queue.extend(ready);
    }

    if order.len() != graph.node_count() {
        return Err(OrderError::CyclicWorkflow);
    }

    Ok(order)
}
