//! Completion provider abstraction for the flowline platform.
//!
//! Completion nodes call a model provider through one backend trait; the
//! engine never sees provider wire formats. The HTTP implementation covers
//! OpenAI, Anthropic, and Gemini.

pub mod backend;
pub mod error;
pub mod http;

pub use backend::{CompletionBackend, CompletionRequest, CompletionResponse, Provider};
pub use error::CompletionError;
pub use http::HttpCompletionBackend;
