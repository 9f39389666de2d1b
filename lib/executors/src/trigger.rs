//! Trigger node executors.
//!
//! Triggers are the entry points of a workflow. By the time the run starts,
//! the trigger's payload is already seeded into the context by ingress, so
//! the executor just commits the context through a named durable step and
//! passes it along unchanged.

use async_trait::async_trait;
use flowline_workflow::{ExecutionContext, ExecutorInvocation, NodeError, NodeExecutor, run_step};

/// Executor for trigger nodes.
pub struct TriggerExecutor {
    step_name: &'static str,
}

impl TriggerExecutor {
    /// Executor for user-initiated triggers.
    #[must_use]
    pub fn manual() -> Self {
        Self {
            step_name: "manual-trigger",
        }
    }

    /// Executor for Google Form submission triggers.
    #[must_use]
    pub fn google_form() -> Self {
        Self {
            step_name: "google-form-trigger",
        }
    }

    /// Executor for Stripe event triggers.
    #[must_use]
    pub fn stripe() -> Self {
        Self {
            step_name: "stripe-trigger",
        }
    }
}

#[async_trait]
impl NodeExecutor for TriggerExecutor {
    async fn execute(
        &self,
        invocation: ExecutorInvocation<'_>,
    ) -> Result<ExecutionContext, NodeError> {
        let context = invocation.context;
        run_step(invocation.step, self.step_name, || async move {
            Ok(context)
        })
        .await
    }
}
