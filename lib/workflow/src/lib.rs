//! Workflow execution engine for the flowline platform.
//!
//! This crate provides the core workflow execution engine, including:
//!
//! - **Graph Model**: Nodes, connections, and workflow definitions
//! - **Execution Order**: Deterministic topological ordering with cycle detection
//! - **Execution Context**: The value bag threaded through a run
//! - **Template Renderer**: Handlebars rendering of node configuration fields
//! - **Durable Steps**: Named, memoized units of work for safe retries
//! - **Status Channels**: Per-node-kind status broadcasting
//! - **Runner**: Sequential, fail-fast execution of one workflow run

pub mod connection;
pub mod context;
pub mod definition;
pub mod error;
pub mod executor;
pub mod node;
pub mod order;
pub mod runner;
pub mod status;
pub mod step;
pub mod template;

pub use connection::Connection;
pub use context::ExecutionContext;
pub use definition::{MemoryWorkflowStore, Workflow, WorkflowStore};
pub use error::{
    DefinitionError, NodeError, OrderError, PublishError, RunError, StoreError, TemplateError,
};
pub use executor::{ExecutorInvocation, ExecutorRegistry, NodeExecutor};
pub use node::{Node, NodeId, NodeKind};
pub use order::execution_order;
pub use runner::{RunReport, RunStatus, WorkflowRunner};
pub use status::{
    MemoryStatusPublisher, NatsStatusPublisher, NodeStatus, StatusEvent, StatusHandle,
    StatusPublisher, latest_status,
};
pub use step::{MemoStepRunner, ScopedStepRunner, StepRunner, run_step};
pub use template::TemplateRenderer;
