//! The execution context threaded through a workflow run.
//!
//! The context is a mapping from variable name to structured value, seeded
//! by trigger-provided initial data and extended by each node's output under
//! the node's configured variable name. It is owned by exactly one run and
//! passed by value between steps, so a retried step can never observe a
//! partially-mutated context from an attempt that will be replayed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// The accumulated key-value result set of one workflow run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionContext(Map<String, JsonValue>);

impl ExecutionContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Seeds a context from trigger-provided initial data.
    ///
    /// Only JSON objects carry variables; any other value seeds an empty
    /// context.
    #[must_use]
    pub fn seed(initial: JsonValue) -> Self {
        match initial {
            JsonValue::Object(map) => Self(map),
            _ => Self::new(),
        }
    }

    /// Returns the value bound to a variable name, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.0.get(name)
    }

    /// Returns true if a variable is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns a copy of this context extended with one output binding.
    ///
    /// Copy-on-write semantics: the original context is consumed, and the
    /// result carries every prior variable plus the new one.
    #[must_use]
    pub fn with_output(mut self, variable_name: &str, value: JsonValue) -> Self {
        self.0.insert(variable_name.to_string(), value);
        self
    }

    /// Returns true if this context carries every binding of `other`,
    /// unchanged.
    ///
    /// Executors must return a superset of their input context; downstream
    /// nodes need every prior variable.
    #[must_use]
    pub fn is_superset_of(&self, other: &Self) -> bool {
        other
            .0
            .iter()
            .all(|(name, value)| self.0.get(name) == Some(value))
    }

    /// Returns the context as a JSON object for template rendering.
    #[must_use]
    pub fn as_value(&self) -> JsonValue {
        JsonValue::Object(self.0.clone())
    }

    /// Returns the number of bound variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no variables are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the bound variables.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.0.iter()
    }
}

impl From<Map<String, JsonValue>> for ExecutionContext {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }
}
