//! The execution-run launch contract.
//!
//! Every trigger ingress path converges here: after authentication and
//! payload validation, `{workflow_id, initial_data}` is handed off and a
//! run is scheduled asynchronously. This is the single entry point into the
//! workflow runner.

use crate::error::LaunchError;
use async_trait::async_trait;
use flowline_core::WorkflowId;
use serde_json::Value as JsonValue;

/// Schedules workflow runs.
#[async_trait]
pub trait RunLauncher: Send + Sync {
    /// Asynchronously schedules one run of the workflow with the given
    /// initial context data.
    ///
    /// Returning `Ok` means the run was accepted, not that it completed;
    /// execution proceeds in the background.
    async fn launch(
        &self,
        workflow_id: WorkflowId,
        initial_data: JsonValue,
    ) -> Result<(), LaunchError>;
}
