//! Core domain types for the flowline workflow automation platform.
//!
//! This crate provides the strongly-typed identifiers shared by every other
//! flowline crate.

pub mod id;

pub use id::{CredentialId, UserId, WorkflowId, WorkflowRunId};
