//! Error types for completion backends.

use std::fmt;

/// A completion backend failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// The request never produced an HTTP response (network, TLS, timeout).
    Transport { message: String },
    /// The provider rejected or failed the request.
    Api { status: u16, message: String },
    /// The provider responded but the body did not contain generated text.
    InvalidResponse { message: String },
}

impl CompletionError {
    /// Returns true if retrying the call could reasonably succeed.
    ///
    /// Transport failures and server-side errors are transient; client
    /// errors are permanent rejections, except request timeouts (408) and
    /// rate limits (429).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Api { status, .. } => !(400..500).contains(status) || matches!(status, 408 | 429),
            Self::InvalidResponse { .. } => false,
        }
    }
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { message } => write!(f, "completion transport error: {message}"),
            Self::Api { status, message } => {
                write!(f, "completion API error ({status}): {message}")
            }
            Self::InvalidResponse { message } => {
                write!(f, "invalid completion response: {message}")
            }
        }
    }
}

impl std::error::Error for CompletionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_are_transient() {
        let err = CompletionError::Transport {
            message: "connection reset".to_string(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn client_errors_are_permanent_except_throttling() {
        let unauthorized = CompletionError::Api {
            status: 401,
            message: "bad key".to_string(),
        };
        assert!(!unauthorized.is_transient());

        let rate_limited = CompletionError::Api {
            status: 429,
            message: "slow down".to_string(),
        };
        assert!(rate_limited.is_transient());

        let server_error = CompletionError::Api {
            status: 503,
            message: "overloaded".to_string(),
        };
        assert!(server_error.is_transient());
    }

    #[test]
    fn malformed_body_is_permanent() {
        let err = CompletionError::InvalidResponse {
            message: "no candidates".to_string(),
        };
        assert!(!err.is_transient());
    }
}
