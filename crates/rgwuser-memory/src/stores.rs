//! In-memory secret and status stores.

use std::collections::BTreeMap;

use async_trait::async_trait;
use dashmap::DashMap;
use rgwuser_core::{ObjectUserStatus, Result, SecretStore, StatusStore};

fn key(namespace: &str, name: &str) -> String {
    format!("{namespace}/{name}")
}

#[derive(Debug, Default)]
pub struct InMemorySecretStore {
    secrets: DashMap<String, BTreeMap<String, String>>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style seeding, e.g. for admin credentials.
    pub fn with_secret<I, K, V>(self, namespace: &str, name: &str, data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let data = data
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.secrets.insert(key(namespace, name), data);
        self
    }

    pub fn contains(&self, namespace: &str, name: &str) -> bool {
        self.secrets.contains_key(&key(namespace, name))
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<BTreeMap<String, String>>> {
        Ok(self
            .secrets
            .get(&key(namespace, name))
            .map(|entry| entry.value().clone()))
    }

    async fn apply(
        &self,
        namespace: &str,
        name: &str,
        data: BTreeMap<String, String>,
    ) -> Result<()> {
        self.secrets.insert(key(namespace, name), data);
        Ok(())
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<()> {
        self.secrets.remove(&key(namespace, name));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStatusStore {
    statuses: DashMap<String, ObjectUserStatus>,
}

impl InMemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, namespace: &str, name: &str) -> Option<ObjectUserStatus> {
        self.statuses
            .get(&key(namespace, name))
            .map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl StatusStore for InMemoryStatusStore {
    async fn update(&self, namespace: &str, name: &str, status: &ObjectUserStatus) -> Result<()> {
        self.statuses.insert(key(namespace, name), status.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rgwuser_core::Phase;

    #[tokio::test]
    async fn test_secret_roundtrip() {
        let store = InMemorySecretStore::new().with_secret(
            "rook-ceph",
            "admin",
            [("accessKey", "AK"), ("secretKey", "SK")],
        );
        let data = store.get("rook-ceph", "admin").await.unwrap().unwrap();
        assert_eq!(data.get("accessKey").map(String::as_str), Some("AK"));

        store.delete("rook-ceph", "admin").await.unwrap();
        assert!(store.get("rook-ceph", "admin").await.unwrap().is_none());
        // deleting twice is fine
        store.delete("rook-ceph", "admin").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_status_update_overwrites() {
        let store = InMemoryStatusStore::new();
        assert!(store.status("ns", "u").is_none());

        let mut status = ObjectUserStatus::default();
        store.update("ns", "u", &status).await.unwrap();
        status.phase = Phase::Ready;
        store.update("ns", "u", &status).await.unwrap();

        assert_eq!(store.status("ns", "u").unwrap().phase, Phase::Ready);
    }
}
