//! Error types for webhook ingress.

use std::fmt;

/// A webhook signature verification failure.
///
/// Ingress-only: a request failing verification is rejected before any
/// workflow side effect, and never reaches the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// The request carried no signature although a secret is configured.
    Missing,
    /// The signature header could not be parsed.
    Malformed,
    /// The signature timestamp is outside the accepted tolerance.
    Expired,
    /// The signature does not match the payload.
    Invalid,
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "missing webhook signature"),
            Self::Malformed => write!(f, "malformed signature header"),
            Self::Expired => write!(f, "signature timestamp outside tolerance"),
            Self::Invalid => write!(f, "invalid webhook signature"),
        }
    }
}

impl std::error::Error for SignatureError {}

/// A webhook payload validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadError {
    /// Description of the validation failure.
    pub message: String,
}

impl PayloadError {
    /// Creates a payload error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid payload: {}", self.message)
    }
}

impl std::error::Error for PayloadError {}

/// A run-launch failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchError {
    /// Description of the launch failure.
    pub message: String,
}

impl LaunchError {
    /// Creates a launch error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to launch run: {}", self.message)
    }
}

impl std::error::Error for LaunchError {}
