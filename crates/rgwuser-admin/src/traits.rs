//! The admin API contract consumed by the synchronizers.

use std::sync::Arc;

use async_trait::async_trait;
use rgwuser_core::AccessLevel;

use crate::error::AdminError;
use crate::types::{NewUser, QuotaSettings, RemoteUser, UserCap, UserChanges};

/// User administration operations of an object-storage gateway.
///
/// Every call is a self-contained request/response with no client-side
/// session state, so one instance may be shared by concurrent reconcile
/// passes. Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait AdminApi: Send + Sync {
    /// Reads a user by id.
    ///
    /// Returns `None` if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport or protocol failures, not for missing users.
    async fn get_user(&self, id: &str) -> Result<Option<RemoteUser>, AdminError>;

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Http` if the user already exists.
    async fn create_user(&self, user: &NewUser) -> Result<RemoteUser, AdminError>;

    /// Changes the given attributes of an existing user.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the user does not exist.
    async fn modify_user(&self, id: &str, changes: &UserChanges)
    -> Result<RemoteUser, AdminError>;

    /// Removes a user, optionally purging the objects it owns.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the user does not exist.
    async fn delete_user(&self, id: &str, purge_data: bool) -> Result<(), AdminError>;

    /// Replaces the user quota with `quota`. There are no partial updates.
    async fn set_user_quota(&self, id: &str, quota: &QuotaSettings) -> Result<(), AdminError>;

    /// Grants the capabilities in `caps` (`users=read;buckets=read;`).
    ///
    /// Returns the resulting capability list.
    async fn add_user_caps(&self, id: &str, caps: &str) -> Result<Vec<UserCap>, AdminError>;

    /// Revokes the capabilities in `caps`; must match the string previously granted.
    ///
    /// Returns the resulting capability list.
    async fn remove_user_caps(&self, id: &str, caps: &str) -> Result<Vec<UserCap>, AdminError>;

    /// Creates a subuser `name` under user `id`.
    async fn create_subuser(
        &self,
        id: &str,
        name: &str,
        access: AccessLevel,
    ) -> Result<(), AdminError>;

    /// Changes the access level of an existing subuser.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the subuser does not exist.
    async fn modify_subuser(
        &self,
        id: &str,
        name: &str,
        access: AccessLevel,
    ) -> Result<(), AdminError>;

    /// Removes a subuser and its keys.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the subuser does not exist.
    async fn remove_subuser(&self, id: &str, name: &str) -> Result<(), AdminError>;

    /// Returns the name of this adapter for logging/debugging.
    fn backend_name(&self) -> &'static str;
}

/// Type alias for a shareable admin API instance.
pub type DynAdminApi = Arc<dyn AdminApi>;

/// Where and as whom to reach a gateway's admin API for one reconcile pass.
#[derive(Clone, PartialEq, Eq)]
pub struct EndpointContext {
    pub namespace: String,
    pub store: String,
    /// Base URL including scheme, e.g. `http://rook-ceph-rgw-my-store.rook-ceph.svc:80`.
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for EndpointContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointContext")
            .field("namespace", &self.namespace)
            .field("store", &self.store)
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Builds the admin API adapter for an endpoint.
///
/// Injected into the reconciler so tests can substitute an in-memory gateway.
pub trait AdminClientFactory: Send + Sync {
    fn build(&self, context: &EndpointContext) -> Result<DynAdminApi, AdminError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_context_debug_redacts_secret() {
        let ctx = EndpointContext {
            namespace: "rook-ceph".into(),
            store: "my-store".into(),
            endpoint: "http://rgw:80".into(),
            access_key: "AK".into(),
            secret_key: "very-secret".into(),
        };
        let rendered = format!("{ctx:?}");
        assert!(rendered.contains("AK"));
        assert!(!rendered.contains("very-secret"));
    }
}
