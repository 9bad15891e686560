//! Gateway locator: resolves the admin endpoint of an object store.

use rgwuser_admin::EndpointContext;
use rgwuser_core::{DynInventory, DynSecretStore, ObjectStoreInfo};

use crate::error::ReconcileError;
use crate::readiness::{Gate, NotReady};

/// Key of the admin access key in the credentials secret.
pub const ACCESS_KEY_FIELD: &str = "AccessKey";
/// Key of the admin secret key in the credentials secret.
pub const SECRET_KEY_FIELD: &str = "SecretKey";

pub struct GatewayLocator {
    inventory: DynInventory,
    secrets: DynSecretStore,
    credentials_secret: String,
}

impl GatewayLocator {
    pub fn new(
        inventory: DynInventory,
        secrets: DynSecretStore,
        credentials_secret: impl Into<String>,
    ) -> Self {
        Self {
            inventory,
            secrets,
            credentials_secret: credentials_secret.into(),
        }
    }

    /// Finds the store and at least one running gateway pod, then builds the
    /// endpoint context from the store address and the admin credentials.
    pub async fn locate(
        &self,
        namespace: &str,
        store: &str,
    ) -> Result<Gate<EndpointContext>, ReconcileError> {
        let Some(info) = self.inventory.object_store(namespace, store).await? else {
            tracing::info!(namespace = %namespace, store = %store, "object store not found, will retry");
            return Ok(Gate::RetryLater(NotReady::StoreMissing {
                namespace: namespace.to_string(),
                store: store.to_string(),
            }));
        };

        if !self.has_running_gateway(&info).await? {
            tracing::info!(namespace = %namespace, store = %store, "no running gateway pod, will retry");
            return Ok(Gate::RetryLater(NotReady::NoRunningGateway {
                store: store.to_string(),
            }));
        }

        let (access_key, secret_key) = self.admin_credentials(namespace).await?;
        let endpoint = info.admin_endpoint();
        tracing::debug!(store = %store, endpoint = %endpoint, "gateway located");

        Ok(Gate::Proceed(EndpointContext {
            namespace: namespace.to_string(),
            store: store.to_string(),
            endpoint,
            access_key,
            secret_key,
        }))
    }

    async fn has_running_gateway(&self, info: &ObjectStoreInfo) -> Result<bool, ReconcileError> {
        let pods = self
            .inventory
            .pods(&info.namespace, &info.gateway_selector())
            .await?;
        Ok(pods.iter().any(|p| p.is_running()))
    }

    async fn admin_credentials(&self, namespace: &str) -> Result<(String, String), ReconcileError> {
        let data = self
            .secrets
            .get(namespace, &self.credentials_secret)
            .await?
            .ok_or_else(|| {
                ReconcileError::credentials(format!(
                    "secret {namespace}/{} not found",
                    self.credentials_secret
                ))
            })?;

        let field = |key: &str| {
            data.get(key)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| {
                    ReconcileError::credentials(format!(
                        "secret {namespace}/{} has no {key}",
                        self.credentials_secret
                    ))
                })
        };
        Ok((field(ACCESS_KEY_FIELD)?, field(SECRET_KEY_FIELD)?))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use rgwuser_core::{PodInfo, PodPhase};
    use rgwuser_memory::{InMemoryInventory, InMemorySecretStore};
    use tokio_test::block_on;

    fn gateway_pod(phase: PodPhase) -> PodInfo {
        let store = ObjectStoreInfo::new("my-store", "rook-ceph");
        PodInfo {
            name: "rook-ceph-rgw-my-store-a".into(),
            namespace: "rook-ceph".into(),
            labels: store.gateway_selector(),
            phase,
        }
    }

    fn admin_secret() -> InMemorySecretStore {
        InMemorySecretStore::new().with_secret(
            "rook-ceph",
            "rgw-admin-ops-user",
            [
                (ACCESS_KEY_FIELD, "53S6B9S809NUP19IJ2K3"),
                (SECRET_KEY_FIELD, "1bXPegzsGClvoGAiJdHQD1uOW2sQBLAZM9j9VtXR"),
            ],
        )
    }

    fn locator(inventory: InMemoryInventory, secrets: InMemorySecretStore) -> GatewayLocator {
        GatewayLocator::new(Arc::new(inventory), Arc::new(secrets), "rgw-admin-ops-user")
    }

    #[test]
    fn test_missing_store_retries() {
        let locator = locator(InMemoryInventory::new(), admin_secret());
        let gate = block_on(locator.locate("rook-ceph", "my-store")).unwrap();
        assert!(matches!(gate, Gate::RetryLater(NotReady::StoreMissing { .. })));
    }

    #[test]
    fn test_store_without_running_pod_retries() {
        let inventory = InMemoryInventory::new();
        block_on(async {
            inventory
                .upsert_object_store(ObjectStoreInfo::new("my-store", "rook-ceph"))
                .await;
            inventory.upsert_pod(gateway_pod(PodPhase::Pending)).await;
        });
        let locator = locator(inventory, admin_secret());
        let gate = block_on(locator.locate("rook-ceph", "my-store")).unwrap();
        assert!(matches!(gate, Gate::RetryLater(NotReady::NoRunningGateway { .. })));
    }

    #[test]
    fn test_running_pod_yields_endpoint_context() {
        let inventory = InMemoryInventory::new();
        block_on(async {
            inventory
                .upsert_object_store(ObjectStoreInfo::new("my-store", "rook-ceph"))
                .await;
            inventory.upsert_pod(gateway_pod(PodPhase::Running)).await;
        });
        let locator = locator(inventory, admin_secret());
        match block_on(locator.locate("rook-ceph", "my-store")).unwrap() {
            Gate::Proceed(ctx) => {
                assert_eq!(ctx.endpoint, "http://rook-ceph-rgw-my-store.rook-ceph.svc:80");
                assert_eq!(ctx.access_key, "53S6B9S809NUP19IJ2K3");
            }
            other => panic!("expected Proceed, got {other:?}"),
        }
    }

    #[test]
    fn test_rook_labelled_gateway_pod_is_found_without_selector_override() {
        let inventory = InMemoryInventory::new();
        block_on(async {
            inventory
                .upsert_object_store(ObjectStoreInfo::new("my-store", "rook-ceph"))
                .await;
            inventory
                .upsert_pod(PodInfo {
                    name: "rook-ceph-rgw-my-store-a-5fd6fb4489-xv65v".into(),
                    namespace: "rook-ceph".into(),
                    labels: [("app", "rook-ceph-rgw"), ("rgw", "my-store")]
                        .into_iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                    phase: PodPhase::Running,
                })
                .await;
        });
        let locator = locator(inventory, admin_secret());
        let gate = block_on(locator.locate("rook-ceph", "my-store")).unwrap();
        assert!(gate.is_proceed(), "unexpected gate: {gate:?}");
    }

    #[test]
    fn test_missing_admin_secret_is_error() {
        let inventory = InMemoryInventory::new();
        block_on(async {
            inventory
                .upsert_object_store(ObjectStoreInfo::new("my-store", "rook-ceph"))
                .await;
            inventory.upsert_pod(gateway_pod(PodPhase::Running)).await;
        });
        let locator = locator(inventory, InMemorySecretStore::new());
        let err = block_on(locator.locate("rook-ceph", "my-store")).unwrap_err();
        assert!(matches!(err, ReconcileError::Credentials(_)));
    }
}
