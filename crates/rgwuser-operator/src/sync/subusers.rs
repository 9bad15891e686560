//! Subuser reconciliation: symmetric diff by name.

use std::collections::HashMap;

use rgwuser_admin::{DynAdminApi, SubuserInfo};
use rgwuser_core::{AccessLevel, SubuserSpec};

use crate::error::SyncError;

/// Calls needed to converge the subusers of one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubuserPlan {
    /// Remote names absent from the declaration.
    pub delete: Vec<String>,
    /// Declared subusers absent remotely.
    pub create: Vec<SubuserSpec>,
    /// Declared subusers whose remote access level differs.
    pub modify: Vec<SubuserSpec>,
}

impl SubuserPlan {
    /// Computes the diff. A rename shows up as one delete plus one create.
    pub fn new(desired: &[SubuserSpec], remote: &[SubuserInfo]) -> Self {
        let remote_access: HashMap<&str, Option<AccessLevel>> = remote
            .iter()
            .map(|s| (s.name(), AccessLevel::from_token(&s.permissions)))
            .collect();
        let desired_names: HashMap<&str, &SubuserSpec> =
            desired.iter().map(|s| (s.name.as_str(), s)).collect();

        let mut plan = Self::default();
        for sub in remote {
            if !desired_names.contains_key(sub.name()) {
                plan.delete.push(sub.name().to_string());
            }
        }
        for sub in desired {
            match remote_access.get(sub.name.as_str()) {
                None => plan.create.push(sub.clone()),
                Some(current) if *current != Some(sub.access) => plan.modify.push(sub.clone()),
                Some(_) => {}
            }
        }
        plan
    }

    pub fn is_empty(&self) -> bool {
        self.delete.is_empty() && self.create.is_empty() && self.modify.is_empty()
    }
}

/// Names touched by one subuser pass.
#[derive(Debug, Default)]
pub struct SubuserResult {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub deleted: Vec<String>,
}

pub struct SubuserSynchronizer {
    admin: DynAdminApi,
}

impl SubuserSynchronizer {
    pub fn new(admin: DynAdminApi) -> Self {
        Self { admin }
    }

    /// Runs the delete, create and modify passes; the first failing call aborts.
    pub async fn sync(
        &self,
        user_id: &str,
        desired: &[SubuserSpec],
        remote: &[SubuserInfo],
    ) -> Result<SubuserResult, SyncError> {
        let plan = SubuserPlan::new(desired, remote);
        let mut result = SubuserResult::default();
        if plan.is_empty() {
            return Ok(result);
        }

        for name in &plan.delete {
            match self.admin.remove_subuser(user_id, name).await {
                Ok(()) => {}
                // already gone
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e.into()),
            }
            result.deleted.push(name.clone());
        }

        for sub in &plan.create {
            self.admin
                .create_subuser(user_id, &sub.name, sub.access)
                .await?;
            result.created.push(sub.name.clone());
        }

        for sub in &plan.modify {
            match self
                .admin
                .modify_subuser(user_id, &sub.name, sub.access)
                .await
            {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {
                    self.admin
                        .create_subuser(user_id, &sub.name, sub.access)
                        .await?;
                }
                Err(e) => return Err(e.into()),
            }
            result.updated.push(sub.name.clone());
        }

        tracing::info!(
            user = %user_id,
            created = result.created.len(),
            updated = result.updated.len(),
            deleted = result.deleted.len(),
            "subusers reconciled"
        );
        Ok(result)
    }
}
