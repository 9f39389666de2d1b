//! Credential model and store contract for the flowline platform.
//!
//! Credentials are opaque secrets (API keys, signing secrets) owned by a
//! user and scoped to a provider. They are encrypted at rest; decryption is
//! the store implementation's concern, and executors only ever see a
//! decrypted value for the single step that uses it.

pub mod credential;
pub mod error;

pub use credential::{
    Credential, CredentialProvider, CredentialStore, DecryptedCredential, MemoryCredentialStore,
};
pub use error::CredentialError;
