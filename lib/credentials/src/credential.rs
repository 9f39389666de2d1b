//! Credential types and the store contract.

use crate::error::CredentialError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flowline_core::{CredentialId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// The provider a credential authenticates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialProvider {
    /// OpenAI API key.
    #[serde(rename = "openai")]
    OpenAi,
    /// Anthropic API key.
    Anthropic,
    /// Gemini API key.
    Gemini,
    /// Stripe API secret key.
    Stripe,
}

/// Credential metadata, safe to list and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// Unique identifier.
    pub id: CredentialId,
    /// The user who owns this credential.
    pub user_id: UserId,
    /// The provider this credential authenticates against.
    pub provider: CredentialProvider,
    /// Display name.
    pub name: String,
    /// When the credential was created.
    pub created_at: DateTime<Utc>,
}

impl Credential {
    /// Creates new credential metadata.
    #[must_use]
    pub fn new(
        user_id: UserId,
        provider: CredentialProvider,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: CredentialId::new(),
            user_id,
            provider,
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// A credential with its decrypted secret value.
///
/// Only produced by a store lookup; never persisted in this form and never
/// cached beyond the single step that used it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecryptedCredential {
    /// The credential's identifier.
    pub id: CredentialId,
    /// The provider it authenticates against.
    pub provider: CredentialProvider,
    /// The decrypted secret.
    pub value: String,
}

/// User-scoped credential lookup.
///
/// Every lookup carries the invoking user; a credential owned by a
/// different user resolves to `None`, exactly like one that does not exist.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetches a credential by ID, scoped to the invoking user.
    async fn find_by_id(
        &self,
        id: CredentialId,
        user_id: UserId,
    ) -> Result<Option<DecryptedCredential>, CredentialError>;

    /// Fetches the user's first credential for a provider.
    async fn find_by_provider(
        &self,
        user_id: UserId,
        provider: CredentialProvider,
    ) -> Result<Option<DecryptedCredential>, CredentialError>;
}

/// In-memory credential store for tests and the local server runtime.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: RwLock<HashMap<CredentialId, (Credential, String)>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a credential with its secret value.
    pub async fn insert(&self, credential: Credential, value: impl Into<String>) {
        self.entries
            .write()
            .await
            .insert(credential.id, (credential, value.into()));
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_id(
        &self,
        id: CredentialId,
        user_id: UserId,
    ) -> Result<Option<DecryptedCredential>, CredentialError> {
        Ok(self.entries.read().await.get(&id).and_then(
            |(credential, value)| {
                (credential.user_id == user_id).then(|| DecryptedCredential {
                    id: credential.id,
                    provider: credential.provider,
                    value: value.clone(),
                })
            },
        ))
    }

    async fn find_by_provider(
        &self,
        user_id: UserId,
        provider: CredentialProvider,
    ) -> Result<Option<DecryptedCredential>, CredentialError> {
        Ok(self
            .entries
            .read()
            .await
            .values()
            .find(|(credential, _)| {
                credential.user_id == user_id && credential.provider == provider
            })
            .map(|(credential, value)| DecryptedCredential {
                id: credential.id,
                provider: credential.provider,
                value: value.clone(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_is_scoped_to_the_owner() {
        let store = MemoryCredentialStore::new();
        let owner = UserId::new();
        let credential = Credential::new(owner, CredentialProvider::OpenAi, "work key");
        let id = credential.id;
        store.insert(credential, "sk-test").await;

        let found = store.find_by_id(id, owner).await.expect("store");
        assert_eq!(found.map(|c| c.value), Some("sk-test".to_string()));

        // Another user's lookup sees nothing, not a permission error.
        let other = store.find_by_id(id, UserId::new()).await.expect("store");
        assert!(other.is_none());
    }

    #[tokio::test]
    async fn find_by_provider_filters_by_user_and_provider() {
        let store = MemoryCredentialStore::new();
        let owner = UserId::new();
        store
            .insert(
                Credential::new(owner, CredentialProvider::Stripe, "stripe key"),
                "sk_live_1",
            )
            .await;
        store
            .insert(
                Credential::new(UserId::new(), CredentialProvider::Stripe, "other"),
                "sk_live_2",
            )
            .await;

        let found = store
            .find_by_provider(owner, CredentialProvider::Stripe)
            .await
            .expect("store")
            .expect("credential");
        assert_eq!(found.value, "sk_live_1");

        let missing = store
            .find_by_provider(owner, CredentialProvider::Anthropic)
            .await
            .expect("store");
        assert!(missing.is_none());
    }

    #[test]
    fn provider_serde_tags() {
        let json = serde_json::to_string(&CredentialProvider::OpenAi).expect("serialize");
        assert_eq!(json, "\"openai\"");
        let parsed: CredentialProvider =
            serde_json::from_str("\"stripe\"").expect("deserialize");
        assert_eq!(parsed, CredentialProvider::Stripe);
    }
}
