//! The workflow run driver.
//!
//! Drives one workflow run to completion or to a terminal failure: computes
//! the execution order, then executes each node strictly sequentially,
//! threading the context forward and publishing per-node status events.
//!
//! The run is a fail-fast pipeline, not a saga: the first node failure
//! aborts every remaining node, with no compensation. Retry of transient
//! failures belongs to the surrounding durable-step layer, which re-invokes
//! the run with the same step memo so completed side effects replay instead
//! of re-firing.

use crate::context::ExecutionContext;
use crate::definition::Workflow;
use crate::error::{NodeError, RunError};
use crate::executor::{ExecutorInvocation, ExecutorRegistry};
use crate::node::{Node, NodeId};
use crate::order::execution_order;
use crate::status::{NodeStatus, StatusHandle, StatusPublisher};
use crate::step::{ScopedStepRunner, StepRunner};
use chrono::{DateTime, Utc};
use flowline_core::{UserId, WorkflowRunId};
use std::collections::HashMap;
use std::sync::Arc;

/// The state of a workflow run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    /// The run has not started executing nodes yet.
    Pending,
    /// The run is executing the given node.
    Running { node_id: NodeId },
    /// Every node completed.
    Completed,
    /// A node failed; the remaining nodes were not dispatched.
    Failed { node_id: NodeId, error: NodeError },
}

impl RunStatus {
    /// Returns true if this is a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed { .. })
    }
}

/// The observable outcome of one workflow run.
///
/// The context is the only durable record of execution: on the error path
/// it carries every contribution from nodes that completed before the
/// failure, and nothing from nodes that never ran.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Unique identifier for this run.
    pub run_id: WorkflowRunId,
    /// Terminal state of the run.
    pub status: RunStatus,
    /// The context as of the last completed node.
    pub context: ExecutionContext,
    /// Nodes that ran to completion, in execution order.
    pub completed_nodes: Vec<NodeId>,
    /// When the run started executing.
    pub started_at: DateTime<Utc>,
    /// When the run reached its terminal state.
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Returns true if every node completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self.status, RunStatus::Completed)
    }
}

/// Executes workflow runs.
///
/// One runner serves many runs; all per-run state lives in the run itself.
pub struct WorkflowRunner {
    registry: ExecutorRegistry,
    publisher: Arc<dyn StatusPublisher>,
}

impl WorkflowRunner {
    /// Creates a runner over the given registry and status transport.
    #[must_use]
    pub fn new(registry: ExecutorRegistry, publisher: Arc<dyn StatusPublisher>) -> Self {
        Self {
            registry,
            publisher,
        }
    }

    /// Drives one run to completion or terminal failure.
    ///
    /// Nodes execute strictly sequentially in the computed order. Around
    /// every node the runner publishes the guaranteed status pair: `loading`
    /// before the executor is invoked, then `success` or `error` after,
    /// never more, never fewer, never reordered. A node therefore never
    /// silently disappears from the status stream, regardless of where in
    /// the executor the failure happened.
    ///
    /// # Errors
    ///
    /// Returns an error only for pre-execution failures (invalid definition,
    /// cyclic graph); node failures are reported through the returned
    /// [`RunReport`] so the error-path context stays observable.
    #[tracing::instrument(skip(self, workflow, initial_context, step), fields(workflow_id = %workflow.id))]
    pub async fn run(
        &self,
        workflow: &Workflow,
        initial_context: ExecutionContext,
        user_id: UserId,
        step: &dyn StepRunner,
    ) -> Result<RunReport, RunError> {
        workflow.validate()?;
        let order = execution_order(&workflow.nodes, &workflow.connections)?;

        let nodes_by_id: HashMap<&NodeId, &Node> =
            workflow.nodes.iter().map(|n| (&n.id, n)).collect();

        let run_id = WorkflowRunId::new();
        let started_at = Utc::now();
        let mut context = initial_context;
        let mut completed_nodes = Vec::with_capacity(order.len());

        tracing::info!(%run_id, nodes = order.len(), "workflow run started");

        for node_id in &order {
            let Some(node) = nodes_by_id.get(node_id) else {
                // Unreachable after validation; kept as a guarded failure so
                // a bad order can never dispatch a phantom node.
                let error = NodeError::non_retriable(format!("node {node_id} not in workflow"));
                return Ok(self.fail(run_id, node_id, error, context, completed_nodes, started_at));
            };

            let status = StatusHandle::new(self.publisher.as_ref(), node.kind.channel());
            status.publish(node_id, NodeStatus::Loading).await;

            let Some(executor) = self.registry.get(node.kind) else {
                let error =
                    NodeError::non_retriable(format!("no executor registered for {}", node.kind));
                status.publish(node_id, NodeStatus::Error).await;
                return Ok(self.fail(run_id, node_id, error, context, completed_nodes, started_at));
            };

            // Step names repeat across nodes (every completion node runs a
            // get-credential step), so scope them by node ID.
            let scoped_step = ScopedStepRunner::new(step, node_id.as_str());
            let invocation = ExecutorInvocation {
                node_id,
                data: &node.data,
                user_id,
                context: context.clone(),
                step: &scoped_step,
                status: &status,
            };

            match executor.execute(invocation).await {
                Ok(next_context) => {
                    if !next_context.is_superset_of(&context) {
                        tracing::warn!(
                            %node_id,
                            "executor dropped or changed prior context variables"
                        );
                    }
                    context = next_context;
                    completed_nodes.push(node_id.clone());
                    status.publish(node_id, NodeStatus::Success).await;
                }
                Err(error) => {
                    status.publish(node_id, NodeStatus::Error).await;
                    tracing::error!(%run_id, %node_id, %error, retriable = error.is_retriable(), "node failed");
                    return Ok(self.fail(run_id, node_id, error, context, completed_nodes, started_at));
                }
            }
        }

        tracing::info!(%run_id, "workflow run completed");
        Ok(RunReport {
            run_id,
            status: RunStatus::Completed,
            context,
            completed_nodes,
            started_at,
            finished_at: Utc::now(),
        })
    }

    fn fail(
        &self,
        run_id: WorkflowRunId,
        node_id: &NodeId,
        error: NodeError,
        context: ExecutionContext,
        completed_nodes: Vec<NodeId>,
        started_at: DateTime<Utc>,
    ) -> RunReport {
        RunReport {
            run_id,
            status: RunStatus::Failed {
                node_id: node_id.clone(),
                error,
            },
            context,
            completed_nodes,
            started_at,
            finished_at: Utc::now(),
        }
    }
}
