//! Write-side collaborators: the credential secret store and the status store.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::status::ObjectUserStatus;

/// Key/value secret storage, addressed by namespace and name.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Returns `None` if the secret does not exist.
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<BTreeMap<String, String>>>;

    /// Creates or fully replaces the secret data.
    async fn apply(&self, namespace: &str, name: &str, data: BTreeMap<String, String>)
    -> Result<()>;

    /// Deleting a missing secret is not an error.
    async fn delete(&self, namespace: &str, name: &str) -> Result<()>;
}

/// Persists the status surface of object users.
#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn update(&self, namespace: &str, name: &str, status: &ObjectUserStatus) -> Result<()>;
}

pub type DynSecretStore = Arc<dyn SecretStore>;
pub type DynStatusStore = Arc<dyn StatusStore>;
