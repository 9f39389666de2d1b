//! Error types for credential storage.

use std::fmt;

/// A credential store failure.
///
/// A missing credential is not an error: lookups return `None` so that a
/// credential owned by another user is indistinguishable from one that does
/// not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialError {
    /// Description of the store failure.
    pub message: String,
}

impl CredentialError {
    /// Creates a store error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "credential store error: {}", self.message)
    }
}

impl std::error::Error for CredentialError {}
