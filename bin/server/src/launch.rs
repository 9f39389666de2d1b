//! Run launching on the local tokio runtime.
//!
//! Every trigger ingress path hands `{workflow_id, initial_data}` to this
//! launcher, which fetches the workflow and spawns the run as a background
//! task. The request path never waits for the run.

use async_trait::async_trait;
use flowline_core::WorkflowId;
use flowline_ingress::{LaunchError, RunLauncher};
use flowline_workflow::{
    ExecutionContext, MemoStepRunner, RunStatus, WorkflowRunner, WorkflowStore,
};
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Launches workflow runs as tokio tasks.
pub struct TokioRunLauncher {
    workflows: Arc<dyn WorkflowStore>,
    runner: Arc<WorkflowRunner>,
}

impl TokioRunLauncher {
    /// Creates a launcher over the given store and runner.
    #[must_use]
    pub fn new(workflows: Arc<dyn WorkflowStore>, runner: Arc<WorkflowRunner>) -> Self {
        Self { workflows, runner }
    }
}

#[async_trait]
impl RunLauncher for TokioRunLauncher {
    async fn launch(
        &self,
        workflow_id: WorkflowId,
        initial_data: JsonValue,
    ) -> Result<(), LaunchError> {
        let workflow = self
            .workflows
            .get(workflow_id)
            .await
            .map_err(|e| LaunchError::new(e.to_string()))?
            .ok_or_else(|| LaunchError::new(format!("workflow not found: {workflow_id}")))?;

        let runner = Arc::clone(&self.runner);
        tokio::spawn(async move {
            let step = MemoStepRunner::new();
            let context = ExecutionContext::seed(initial_data);
            let user_id = workflow.user_id;

            match runner.run(&workflow, context, user_id, &step).await {
                Ok(report) => match &report.status {
                    RunStatus::Failed { node_id, error } => {
                        tracing::warn!(
                            %workflow_id,
                            run_id = %report.run_id,
                            %node_id,
                            %error,
                            "workflow run failed"
                        );
                    }
                    _ => {
                        tracing::info!(
                            %workflow_id,
                            run_id = %report.run_id,
                            nodes = report.completed_nodes.len(),
                            "workflow run finished"
                        );
                    }
                },
                Err(e) => {
                    tracing::error!(%workflow_id, error = %e, "workflow run rejected");
                }
            }
        });

        Ok(())
    }
}
