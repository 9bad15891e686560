//! In-memory cluster inventory, loadable from a serialized snapshot.

use std::collections::BTreeMap;

use async_trait::async_trait;
use rgwuser_core::{CephClusterInfo, ClusterInventory, ObjectStoreInfo, PodInfo, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Serializable set of cluster objects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySnapshot {
    #[serde(default)]
    pub clusters: Vec<CephClusterInfo>,
    #[serde(default)]
    pub object_stores: Vec<ObjectStoreInfo>,
    #[serde(default)]
    pub pods: Vec<PodInfo>,
}

#[derive(Debug, Default)]
pub struct InMemoryInventory {
    snapshot: RwLock<InventorySnapshot>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: InventorySnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
        }
    }

    /// Inserts or replaces the cluster of `cluster.namespace`.
    pub async fn upsert_cluster(&self, cluster: CephClusterInfo) {
        let mut snapshot = self.snapshot.write().await;
        snapshot.clusters.retain(|c| c.namespace != cluster.namespace);
        snapshot.clusters.push(cluster);
    }

    pub async fn upsert_object_store(&self, store: ObjectStoreInfo) {
        let mut snapshot = self.snapshot.write().await;
        snapshot
            .object_stores
            .retain(|s| !(s.namespace == store.namespace && s.name == store.name));
        snapshot.object_stores.push(store);
    }

    pub async fn remove_object_store(&self, namespace: &str, name: &str) {
        self.snapshot
            .write()
            .await
            .object_stores
            .retain(|s| !(s.namespace == namespace && s.name == name));
    }

    pub async fn upsert_pod(&self, pod: PodInfo) {
        let mut snapshot = self.snapshot.write().await;
        snapshot
            .pods
            .retain(|p| !(p.namespace == pod.namespace && p.name == pod.name));
        snapshot.pods.push(pod);
    }

    pub async fn remove_pod(&self, namespace: &str, name: &str) {
        self.snapshot
            .write()
            .await
            .pods
            .retain(|p| !(p.namespace == namespace && p.name == name));
    }
}

#[async_trait]
impl ClusterInventory for InMemoryInventory {
    async fn cluster(&self, namespace: &str) -> Result<Option<CephClusterInfo>> {
        let snapshot = self.snapshot.read().await;
        Ok(snapshot
            .clusters
            .iter()
            .find(|c| c.namespace == namespace)
            .cloned())
    }

    async fn object_store(&self, namespace: &str, name: &str) -> Result<Option<ObjectStoreInfo>> {
        let snapshot = self.snapshot.read().await;
        Ok(snapshot
            .object_stores
            .iter()
            .find(|s| s.namespace == namespace && s.name == name)
            .cloned())
    }

    async fn pods(
        &self,
        namespace: &str,
        selector: &BTreeMap<String, String>,
    ) -> Result<Vec<PodInfo>> {
        let snapshot = self.snapshot.read().await;
        Ok(snapshot
            .pods
            .iter()
            .filter(|p| p.namespace == namespace && p.matches(selector))
            .cloned()
            .collect())
    }
}
