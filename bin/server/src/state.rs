//! Shared application state for the HTTP handlers.

use flowline_ingress::RunLauncher;
use flowline_workflow::WorkflowStore;
use std::sync::Arc;

/// State shared by every route.
#[derive(Clone)]
pub struct AppState {
    /// Read-only workflow definitions.
    pub workflows: Arc<dyn WorkflowStore>,
    /// The single entry point into the runner.
    pub launcher: Arc<dyn RunLauncher>,
    /// Accepted clock skew for Stripe signatures, in seconds.
    pub stripe_tolerance_seconds: i64,
}
