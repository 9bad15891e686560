//! Read-only view of the cluster objects the operator depends on.
//!
//! The event-dispatch layer owns the actual resource storage; the operator
//! only consumes it through [`ClusterInventory`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Label key every gateway pod carries with its store name.
pub const GATEWAY_STORE_LABEL: &str = "rgw";
/// Application label shared by all gateway pods.
pub const GATEWAY_APP_LABEL: &str = "app";
pub const GATEWAY_APP_NAME: &str = "rook-ceph-rgw";

/// The storage cluster backing every object store in a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CephClusterInfo {
    pub name: String,
    pub namespace: String,
    /// Lifecycle phase reported by the cluster controller (e.g. `Ready`).
    #[serde(default)]
    pub phase: String,
    /// Health summary (`HEALTH_OK`, `HEALTH_WARN`, `HEALTH_ERR`); absent until first probe.
    #[serde(default)]
    pub health: Option<String>,
}

/// An object store (gateway) definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStoreInfo {
    pub name: String,
    pub namespace: String,
    /// Endpoint published in the store status, when known.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    #[serde(default)]
    pub secure_port: Option<u16>,
    /// Pod selector override; defaults to the standard gateway labels.
    #[serde(default)]
    pub selector: BTreeMap<String, String>,
}

fn default_gateway_port() -> u16 {
    80
}

impl ObjectStoreInfo {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            endpoint: None,
            port: default_gateway_port(),
            secure_port: None,
            selector: BTreeMap::new(),
        }
    }

    /// Labels identifying the gateway pods serving this store.
    pub fn gateway_selector(&self) -> BTreeMap<String, String> {
        if !self.selector.is_empty() {
            return self.selector.clone();
        }
        BTreeMap::from([
            (GATEWAY_APP_LABEL.to_string(), GATEWAY_APP_NAME.to_string()),
            (GATEWAY_STORE_LABEL.to_string(), self.name.clone()),
        ])
    }

    /// Network endpoint of the admin API; the published endpoint wins over the service address.
    pub fn admin_endpoint(&self) -> String {
        if let Some(endpoint) = self.endpoint.as_deref().filter(|e| !e.is_empty()) {
            return endpoint.trim_end_matches('/').to_string();
        }
        let host = format!("{GATEWAY_APP_NAME}-{}.{}.svc", self.name, self.namespace);
        match self.secure_port {
            Some(port) => format!("https://{host}:{port}"),
            None => format!("http://{host}:{}", self.port),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PodPhase {
    #[default]
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodInfo {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub phase: PodPhase,
}

impl PodInfo {
    pub fn is_running(&self) -> bool {
        self.phase == PodPhase::Running
    }

    /// True when every selector label is present with the same value.
    pub fn matches(&self, selector: &BTreeMap<String, String>) -> bool {
        selector
            .iter()
            .all(|(k, v)| self.labels.get(k).is_some_and(|actual| actual == v))
    }
}

/// Lookup of cluster, store and pod objects.
///
/// Absence is reported as `Ok(None)` / an empty list; errors are reserved for
/// failures of the backing store itself.
#[async_trait]
pub trait ClusterInventory: Send + Sync {
    /// The storage cluster of a namespace, if one is declared.
    async fn cluster(&self, namespace: &str) -> Result<Option<CephClusterInfo>>;

    async fn object_store(&self, namespace: &str, name: &str) -> Result<Option<ObjectStoreInfo>>;

    /// Pods in `namespace` whose labels match `selector`.
    async fn pods(
        &self,
        namespace: &str,
        selector: &BTreeMap<String, String>,
    ) -> Result<Vec<PodInfo>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selector() {
        let store = ObjectStoreInfo::new("my-store", "rook-ceph");
        let selector = store.gateway_selector();
        assert_eq!(selector.get("app").map(String::as_str), Some("rook-ceph-rgw"));
        assert_eq!(selector.get("rgw").map(String::as_str), Some("my-store"));
    }

    #[test]
    fn test_admin_endpoint() {
        let mut store = ObjectStoreInfo::new("my-store", "rook-ceph");
        assert_eq!(store.admin_endpoint(), "http://rook-ceph-rgw-my-store.rook-ceph.svc:80");

        store.secure_port = Some(443);
        assert_eq!(store.admin_endpoint(), "https://rook-ceph-rgw-my-store.rook-ceph.svc:443");

        store.endpoint = Some("http://rgw.example:8080/".into());
        assert_eq!(store.admin_endpoint(), "http://rgw.example:8080");
    }

    #[test]
    fn test_pod_matches_selector() {
        let pod = PodInfo {
            name: "rgw-my-store-a".into(),
            namespace: "rook-ceph".into(),
            labels: BTreeMap::from([
                ("app".to_string(), "rook-ceph-rgw".to_string()),
                ("rgw".to_string(), "my-store".to_string()),
                ("pod-template-hash".to_string(), "5fd6fb4489".to_string()),
            ]),
            phase: PodPhase::Running,
        };
        let store = ObjectStoreInfo::new("my-store", "rook-ceph");
        assert!(pod.matches(&store.gateway_selector()));
        assert!(pod.is_running());

        let other = ObjectStoreInfo::new("other-store", "rook-ceph");
        assert!(!pod.matches(&other.gateway_selector()));
    }
}
