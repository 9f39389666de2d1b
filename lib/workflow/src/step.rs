//! Durable step execution.
//!
//! A step is a named unit of work whose result is memoized by the
//! surrounding durable runtime: re-running a completed step returns the
//! recorded value without re-executing its closure, so automatic retries of
//! a run never double-fire an already-committed external effect.
//!
//! The runtime itself is an external collaborator; this module defines the
//! contract the engine consumes plus an in-process implementation used by
//! tests and the local server runtime.

use crate::error::NodeError;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::Mutex;

/// A boxed unit of work executed inside a named step.
pub type StepFuture<'a> = Pin<Box<dyn Future<Output = Result<JsonValue, NodeError>> + Send + 'a>>;

/// The durable step-execution contract.
///
/// Implementations guarantee at-least-once invocation with
/// exactly-once-per-named-step results: a step name that has already
/// produced a value yields that value again without running the work.
#[async_trait]
pub trait StepRunner: Send + Sync {
    /// Executes (or replays) the named step.
    async fn run(&self, name: &str, work: StepFuture<'_>) -> Result<JsonValue, NodeError>;

    /// Suspends the run for the given duration under the given step name.
    async fn sleep(&self, name: &str, duration: Duration) -> Result<(), NodeError>;
}

/// Runs a typed unit of work inside a named step.
///
/// Values round-trip through JSON because that is how the durable runtime
/// persists step results.
///
/// # Errors
///
/// Propagates the work's own error, or a non-retriable error if the result
/// cannot be serialized.
pub async fn run_step<T, F, Fut>(step: &dyn StepRunner, name: &str, work: F) -> Result<T, NodeError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut + Send,
    Fut: Future<Output = Result<T, NodeError>> + Send,
{
    let future = work();
    let value = step
        .run(
            name,
            Box::pin(async move {
                let result = future.await?;
                serde_json::to_value(result).map_err(|e| {
                    NodeError::non_retriable(format!("failed to serialize step result: {e}"))
                })
            }),
        )
        .await?;

    serde_json::from_value(value)
        .map_err(|e| NodeError::non_retriable(format!("failed to deserialize step result: {e}")))
}

/// In-process step runner memoizing results by step name.
///
/// One instance is scoped to one run. Failed steps are not memoized, so a
/// re-invocation of the run re-attempts them while completed steps replay.
#[derive(Debug, Default)]
pub struct MemoStepRunner {
    memo: Mutex<HashMap<String, JsonValue>>,
}

impl MemoStepRunner {
    /// Creates an empty step runner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of completed steps.
    pub async fn completed_steps(&self) -> usize {
        self.memo.lock().await.len()
    }
}

#[async_trait]
impl StepRunner for MemoStepRunner {
    async fn run(&self, name: &str, work: StepFuture<'_>) -> Result<JsonValue, NodeError> {
        if let Some(recorded) = self.memo.lock().await.get(name) {
            return Ok(recorded.clone());
        }

        let value = work.await?;
        self.memo
            .lock()
            .await
            .insert(name.to_string(), value.clone());
        Ok(value)
    }

    async fn sleep(&self, _name: &str, duration: Duration) -> Result<(), NodeError> {
        tokio::time::sleep(duration).await;
        Ok(())
    }
}

/// A step runner that prefixes every step name with a scope.
///
/// The runner scopes steps per node so that two nodes using the same step
/// name (every completion node runs a `get-credential` step, for example)
/// never collide in the memo.
pub struct ScopedStepRunner<'a> {
    inner: &'a dyn StepRunner,
    scope: String,
}

impl<'a> ScopedStepRunner<'a> {
    /// Creates a runner that prefixes step names with `scope:`.
    #[must_use]
    pub fn new(inner: &'a dyn StepRunner, scope: impl Into<String>) -> Self {
        Self {
            inner,
            scope: scope.into(),
        }
    }

    fn scoped(&self, name: &str) -> String {
        format!("{}:{name}", self.scope)
    }
}

#[async_trait]
impl StepRunner for ScopedStepRunner<'_> {
    async fn run(&self, name: &str, work: StepFuture<'_>) -> Result<JsonValue, NodeError> {
        self.inner.run(&self.scoped(name), work).await
    }

    async fn sleep(&self, name: &str, duration: Duration) -> Result<(), NodeError> {
        self.inner.sleep(&self.scoped(name), duration).await
    }
}
