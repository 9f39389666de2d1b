//! Error types for the workflow crate.
//!
//! Each layer owns its own error enum:
//! - `DefinitionError`: invariant violations in a workflow definition
//! - `OrderError`: execution-order computation failures
//! - `TemplateError`: template rendering failures
//! - `NodeError`: node executor failures, classified by retriability
//! - `PublishError`: status publish transport failures
//! - `StoreError`: workflow store failures
//! - `RunError`: pre-execution failures of a run

use crate::node::NodeId;
use flowline_core::CredentialId;
use std::fmt;

/// Invariant violations in a workflow definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    /// Two nodes share the same ID.
    DuplicateNodeId { node_id: NodeId },
    /// A connection endpoint references a node that does not exist.
    UnknownEndpoint { node_id: NodeId },
}

impl fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateNodeId { node_id } => {
                write!(f, "duplicate node id: {node_id}")
            }
            Self::UnknownEndpoint { node_id } => {
                write!(f, "connection references unknown node: {node_id}")
            }
        }
    }
}

impl std::error::Error for DefinitionError {}

/// Failures while computing the execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// The connection set contains a cycle; no valid order exists.
    ///
    /// Fatal for the run: execution must not start.
    CyclicWorkflow,
    /// A connection endpoint references a node that does not exist.
    UnknownNode { node_id: NodeId },
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CyclicWorkflow => write!(f, "workflow contains a cycle"),
            Self::UnknownNode { node_id } => {
                write!(f, "connection references unknown node: {node_id}")
            }
        }
    }
}

impl std::error::Error for OrderError {}

/// A template rendering failure.
///
/// Templates come from node configuration, so rendering failures are
/// configuration problems and map to non-retriable node errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateError {
    /// Description of the rendering failure.
    pub message: String,
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "template rendering failed: {}", self.message)
    }
}

impl std::error::Error for TemplateError {}

impl From<handlebars::RenderError> for TemplateError {
    fn from(e: handlebars::RenderError) -> Self {
        Self {
            message: e.to_string(),
        }
    }
}

/// A node executor failure.
///
/// The classification decides what the surrounding durable-step layer may
/// do: non-retriable errors are deterministic configuration problems where
/// retrying cannot help; retriable errors are transient external failures
/// eligible for the layer's backoff policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// Deterministic failure (missing configuration, invalid template,
    /// permanent API rejection). Aborts the run without retries.
    NonRetriable { message: String },
    /// Transient failure (network, rate limit, upstream outage). The
    /// durable layer may retry the enclosing step.
    Retriable { message: String },
    /// The referenced credential does not exist for the invoking user.
    ///
    /// A configuration problem, so treated as non-retriable. Credentials
    /// owned by other users surface identically, leaking nothing.
    CredentialNotFound { credential_id: CredentialId },
}

impl NodeError {
    /// Creates a non-retriable error.
    #[must_use]
    pub fn non_retriable(message: impl Into<String>) -> Self {
        Self::NonRetriable {
            message: message.into(),
        }
    }

    /// Creates a retriable error.
    #[must_use]
    pub fn retriable(message: impl Into<String>) -> Self {
        Self::Retriable {
            message: message.into(),
        }
    }

    /// Returns true if the durable layer may retry the failed step.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Retriable { .. })
    }
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonRetriable { message } => write!(f, "{message}"),
            Self::Retriable { message } => write!(f, "{message}"),
            Self::CredentialNotFound { credential_id } => {
                write!(f, "credential not found: {credential_id}")
            }
        }
    }
}

impl std::error::Error for NodeError {}

impl From<TemplateError> for NodeError {
    fn from(e: TemplateError) -> Self {
        Self::NonRetriable {
            message: e.to_string(),
        }
    }
}

/// A status publish transport failure.
///
/// Publishing is best-effort telemetry; these errors are logged by the
/// caller and never affect the run outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishError {
    /// Description of the transport failure.
    pub message: String,
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status publish failed: {}", self.message)
    }
}

impl std::error::Error for PublishError {}

/// A workflow store failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    /// Description of the store failure.
    pub message: String,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "workflow store error: {}", self.message)
    }
}

impl std::error::Error for StoreError {}

/// Pre-execution failures of a workflow run.
///
/// These surface before any node executes; node failures during the run are
/// reported through the run report instead, so the error-path context stays
/// observable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    /// The workflow definition violates an invariant.
    Definition(DefinitionError),
    /// No valid execution order exists.
    Order(OrderError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Definition(e) => write!(f, "invalid workflow definition: {e}"),
            Self::Order(e) => write!(f, "cannot order workflow: {e}"),
        }
    }
}

impl std::error::Error for RunError {}

impl From<DefinitionError> for RunError {
    fn from(e: DefinitionError) -> Self {
        Self::Definition(e)
    }
}

impl From<OrderError> for RunError {
    fn from(e: OrderError) -> Self {
        Self::Order(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_error_display() {
        assert_eq!(
            OrderError::CyclicWorkflow.to_string(),
            "workflow contains a cycle"
        );
    }

    #[test]
    fn node_error_retriability() {
        assert!(NodeError::retriable("timeout").is_retriable());
        assert!(!NodeError::non_retriable("missing field").is_retriable());
        assert!(
            !NodeError::CredentialNotFound {
                credential_id: CredentialId::new(),
            }
            .is_retriable()
        );
    }

    #[test]
    fn run_error_wraps_order_error() {
        let err = RunError::from(OrderError::CyclicWorkflow);
        assert!(err.to_string().contains("cycle"));
    }
}
