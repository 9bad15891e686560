use rgwuser_admin::{DynAdminApi, NewUser, RemoteUser, UserChanges};
use rgwuser_core::DesiredUserSpec;

use super::caps::{self, CapsPlan};
use super::quota::desired_quota;
use crate::error::SyncError;

/// Converges one user's attributes, quota and capability string.
pub struct UserSynchronizer {
    admin: DynAdminApi,
    default_max_buckets: i64,
}

impl UserSynchronizer {
    pub fn new(admin: DynAdminApi, default_max_buckets: i64) -> Self {
        Self {
            admin,
            default_max_buckets,
        }
    }

    pub fn effective_max_buckets(&self, desired: &DesiredUserSpec) -> i64 {
        desired.max_buckets.unwrap_or(self.default_max_buckets)
    }

    /// Creates the user or updates its differing attributes, then replaces the
    /// quota and the capability string.
    ///
    /// Returns the remote record as observed at the start of the pass (or as
    /// created), with the attribute changes of this pass applied.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidSpecification` without any call for an
    /// invalid declaration. Any admin API failure aborts the remaining steps;
    /// changes already applied are left in place.
    pub async fn create_or_update(&self, desired: &DesiredUserSpec) -> Result<RemoteUser, SyncError> {
        desired.validate().map_err(SyncError::from_validation)?;
        let id = desired.name.as_str();
        let display_name = desired.effective_display_name();
        let max_buckets = self.effective_max_buckets(desired);

        let mut user = match self.admin.get_user(id).await? {
            None => {
                tracing::info!(user = %id, "creating object store user");
                self.admin
                    .create_user(&NewUser {
                        id: id.to_string(),
                        display_name: display_name.to_string(),
                        max_buckets,
                    })
                    .await?
            }
            Some(existing) => {
                let changes = UserChanges {
                    display_name: (existing.display_name != display_name)
                        .then(|| display_name.to_string()),
                    max_buckets: (existing.max_buckets != Some(max_buckets)).then_some(max_buckets),
                };
                if changes.is_empty() {
                    existing
                } else {
                    tracing::info!(user = %id, ?changes, "updating object store user");
                    self.admin.modify_user(id, &changes).await?
                }
            }
        };

        let quota = desired_quota(desired.quota.as_ref());
        self.admin.set_user_quota(id, &quota).await?;
        user.user_quota = quota;

        let plan = CapsPlan::new(
            caps::applied(&user.caps),
            caps::compose(desired.capabilities.as_ref()),
        );
        if let Some(previous) = &plan.remove {
            tracing::debug!(user = %id, caps = %previous, "removing capabilities");
            user.caps = self.admin.remove_user_caps(id, previous).await?;
        }
        if let Some(next) = &plan.add {
            tracing::debug!(user = %id, caps = %next, "adding capabilities");
            user.caps = self.admin.add_user_caps(id, next).await?;
        }

        Ok(user)
    }
}
