//! Publishes a user's S3 credentials as a secret.

use std::collections::BTreeMap;

use rgwuser_admin::RemoteUser;
use rgwuser_core::DynSecretStore;

use crate::error::{ReconcileError, SyncError};

pub const ACCESS_KEY: &str = "AccessKey";
pub const SECRET_KEY: &str = "SecretKey";
pub const ENDPOINT: &str = "Endpoint";

pub struct CredentialPublisher {
    secrets: DynSecretStore,
}

impl CredentialPublisher {
    pub fn new(secrets: DynSecretStore) -> Self {
        Self { secrets }
    }

    /// Writes the user's first key pair and the gateway endpoint to `secret_name`.
    ///
    /// The write is skipped when the secret already holds the same data.
    pub async fn publish(
        &self,
        namespace: &str,
        secret_name: &str,
        user: &RemoteUser,
        endpoint: &str,
    ) -> Result<(), ReconcileError> {
        let key = user
            .primary_key()
            .ok_or_else(|| SyncError::secret(format!("user {} has no S3 keys", user.id)))?;

        let data = BTreeMap::from([
            (ACCESS_KEY.to_string(), key.access_key.clone()),
            (SECRET_KEY.to_string(), key.secret_key.clone()),
            (ENDPOINT.to_string(), endpoint.to_string()),
        ]);
        if self.secrets.get(namespace, secret_name).await?.as_ref() == Some(&data) {
            return Ok(());
        }
        self.secrets.apply(namespace, secret_name, data).await?;
        tracing::info!(namespace = %namespace, secret = %secret_name, "published user credentials");
        Ok(())
    }

    pub async fn revoke(&self, namespace: &str, secret_name: &str) -> Result<(), ReconcileError> {
        self.secrets.delete(namespace, secret_name).await?;
        Ok(())
    }
}
