//! In-memory object gateway implementing [`AdminApi`].
//!
//! Users live in a map keyed by id. Every call is appended to a log so tests
//! can assert exactly which requests a synchronizer issued.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use rgwuser_admin::{
    AdminApi, AdminError, NewUser, QuotaSettings, RemoteUser, SubuserInfo, UserCap, UserChanges,
    UserKey,
};
use rgwuser_core::AccessLevel;
use tokio::sync::Mutex;

/// One admin API request as observed by the in-memory gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCall {
    GetUser { id: String },
    CreateUser { id: String, display_name: String, max_buckets: i64 },
    ModifyUser { id: String, changes: UserChanges },
    DeleteUser { id: String, purge_data: bool },
    SetQuota { id: String, quota: QuotaSettings },
    AddCaps { id: String, caps: String },
    RemoveCaps { id: String, caps: String },
    CreateSubuser { id: String, name: String, access: AccessLevel },
    ModifySubuser { id: String, name: String, access: AccessLevel },
    RemoveSubuser { id: String, name: String },
}

impl AdminCall {
    pub fn kind(&self) -> CallKind {
        match self {
            Self::GetUser { .. } => CallKind::GetUser,
            Self::CreateUser { .. } => CallKind::CreateUser,
            Self::ModifyUser { .. } => CallKind::ModifyUser,
            Self::DeleteUser { .. } => CallKind::DeleteUser,
            Self::SetQuota { .. } => CallKind::SetQuota,
            Self::AddCaps { .. } => CallKind::AddCaps,
            Self::RemoveCaps { .. } => CallKind::RemoveCaps,
            Self::CreateSubuser { .. } => CallKind::CreateSubuser,
            Self::ModifySubuser { .. } => CallKind::ModifySubuser,
            Self::RemoveSubuser { .. } => CallKind::RemoveSubuser,
        }
    }

    /// True for every call that changes gateway state.
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::GetUser { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    GetUser,
    CreateUser,
    ModifyUser,
    DeleteUser,
    SetQuota,
    AddCaps,
    RemoveCaps,
    CreateSubuser,
    ModifySubuser,
    RemoveSubuser,
}

#[derive(Debug, Default)]
struct GatewayState {
    users: HashMap<String, RemoteUser>,
    calls: Vec<AdminCall>,
    failures: HashMap<CallKind, AdminError>,
}

/// Gateway double with the same observable semantics as the real admin API.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    state: Mutex<GatewayState>,
    key_counter: AtomicU64,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a user record as if it had been created out of band.
    pub async fn insert_user(&self, user: RemoteUser) {
        let mut state = self.state.lock().await;
        state.users.insert(user.id.clone(), user);
    }

    /// Snapshot of a user record.
    pub async fn user(&self, id: &str) -> Option<RemoteUser> {
        self.state.lock().await.users.get(id).cloned()
    }

    pub async fn user_count(&self) -> usize {
        self.state.lock().await.users.len()
    }

    /// All calls received so far, in order.
    pub async fn calls(&self) -> Vec<AdminCall> {
        self.state.lock().await.calls.clone()
    }

    /// Calls that changed (or tried to change) gateway state.
    pub async fn write_calls(&self) -> Vec<AdminCall> {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| c.is_write())
            .cloned()
            .collect()
    }

    pub async fn clear_calls(&self) {
        self.state.lock().await.calls.clear();
    }

    /// Makes every subsequent call of `kind` fail with `error` until cleared.
    pub async fn fail_on(&self, kind: CallKind, error: AdminError) {
        self.state.lock().await.failures.insert(kind, error);
    }

    pub async fn clear_failures(&self) {
        self.state.lock().await.failures.clear();
    }

    fn next_key(&self, id: &str) -> UserKey {
        let n = self.key_counter.fetch_add(1, Ordering::SeqCst);
        UserKey {
            user: id.to_string(),
            access_key: format!("AK{n:018}"),
            secret_key: format!("SK{n:038}"),
        }
    }
}

/// Records the call and returns the injected failure for its kind, if any.
fn record(state: &mut GatewayState, call: AdminCall) -> Result<(), AdminError> {
    let kind = call.kind();
    state.calls.push(call);
    match state.failures.get(&kind) {
        Some(err) => Err(err.clone()),
        None => Ok(()),
    }
}

fn user_mut<'a>(state: &'a mut GatewayState, id: &str) -> Result<&'a mut RemoteUser, AdminError> {
    state
        .users
        .get_mut(id)
        .ok_or_else(|| AdminError::not_found("user", id))
}

const CAP_READ: u8 = 0b01;
const CAP_WRITE: u8 = 0b10;

/// Permission bits of a cap value, the way the gateway stores them.
fn perm_bits(perm: &str) -> u8 {
    perm.split(',').map(str::trim).fold(0, |bits, p| match p {
        "*" => bits | CAP_READ | CAP_WRITE,
        "read" => bits | CAP_READ,
        "write" => bits | CAP_WRITE,
        _ => bits,
    })
}

fn perm_str(bits: u8) -> &'static str {
    match bits {
        CAP_READ => "read",
        CAP_WRITE => "write",
        _ => "*",
    }
}

fn parse_caps(caps: &str) -> Vec<(String, u8)> {
    caps.split(';')
        .filter_map(|entry| entry.split_once('='))
        .map(|(kind, perm)| (kind.trim().to_string(), perm_bits(perm)))
        .collect()
}

#[async_trait]
impl AdminApi for InMemoryGateway {
    async fn get_user(&self, id: &str) -> Result<Option<RemoteUser>, AdminError> {
        let mut state = self.state.lock().await;
        record(&mut state, AdminCall::GetUser { id: id.to_string() })?;
        Ok(state.users.get(id).cloned())
    }

    async fn create_user(&self, user: &NewUser) -> Result<RemoteUser, AdminError> {
        let mut state = self.state.lock().await;
        record(
            &mut state,
            AdminCall::CreateUser {
                id: user.id.clone(),
                display_name: user.display_name.clone(),
                max_buckets: user.max_buckets,
            },
        )?;
        if state.users.contains_key(&user.id) {
            return Err(AdminError::http(409, "UserAlreadyExists", user.id.clone()));
        }
        let created = RemoteUser {
            id: user.id.clone(),
            display_name: user.display_name.clone(),
            max_buckets: Some(user.max_buckets),
            keys: vec![self.next_key(&user.id)],
            ..Default::default()
        };
        state.users.insert(user.id.clone(), created.clone());
        Ok(created)
    }

    async fn modify_user(
        &self,
        id: &str,
        changes: &UserChanges,
    ) -> Result<RemoteUser, AdminError> {
        let mut state = self.state.lock().await;
        record(
            &mut state,
            AdminCall::ModifyUser {
                id: id.to_string(),
                changes: changes.clone(),
            },
        )?;
        let user = user_mut(&mut state, id)?;
        if let Some(display_name) = &changes.display_name {
            user.display_name = display_name.clone();
        }
        if let Some(max_buckets) = changes.max_buckets {
            user.max_buckets = Some(max_buckets);
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, id: &str, purge_data: bool) -> Result<(), AdminError> {
        let mut state = self.state.lock().await;
        record(
            &mut state,
            AdminCall::DeleteUser {
                id: id.to_string(),
                purge_data,
            },
        )?;
        state
            .users
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AdminError::not_found("user", id))
    }

    async fn set_user_quota(&self, id: &str, quota: &QuotaSettings) -> Result<(), AdminError> {
        let mut state = self.state.lock().await;
        record(
            &mut state,
            AdminCall::SetQuota {
                id: id.to_string(),
                quota: *quota,
            },
        )?;
        user_mut(&mut state, id)?.user_quota = *quota;
        Ok(())
    }

    async fn add_user_caps(&self, id: &str, caps: &str) -> Result<Vec<UserCap>, AdminError> {
        let mut state = self.state.lock().await;
        record(
            &mut state,
            AdminCall::AddCaps {
                id: id.to_string(),
                caps: caps.to_string(),
            },
        )?;
        let user = user_mut(&mut state, id)?;
        for (kind, bits) in parse_caps(caps).into_iter().filter(|(_, bits)| *bits != 0) {
            match user.caps.iter_mut().find(|c| c.kind == kind) {
                Some(existing) => {
                    existing.perm = perm_str(perm_bits(&existing.perm) | bits).to_string();
                }
                None => user.caps.push(UserCap {
                    kind,
                    perm: perm_str(bits).to_string(),
                }),
            }
        }
        Ok(user.caps.clone())
    }

    async fn remove_user_caps(&self, id: &str, caps: &str) -> Result<Vec<UserCap>, AdminError> {
        let mut state = self.state.lock().await;
        record(
            &mut state,
            AdminCall::RemoveCaps {
                id: id.to_string(),
                caps: caps.to_string(),
            },
        )?;
        let user = user_mut(&mut state, id)?;
        for (kind, bits) in parse_caps(caps) {
            for cap in user.caps.iter_mut().filter(|c| c.kind == kind) {
                let left = perm_bits(&cap.perm) & !bits;
                cap.perm = if left == 0 {
                    String::new()
                } else {
                    perm_str(left).to_string()
                };
            }
        }
        user.caps.retain(|c| !c.perm.is_empty());
        Ok(user.caps.clone())
    }

    async fn create_subuser(
        &self,
        id: &str,
        name: &str,
        access: AccessLevel,
    ) -> Result<(), AdminError> {
        let mut state = self.state.lock().await;
        record(
            &mut state,
            AdminCall::CreateSubuser {
                id: id.to_string(),
                name: name.to_string(),
                access,
            },
        )?;
        let user = user_mut(&mut state, id)?;
        if user.subusers.iter().any(|s| s.name() == name) {
            return Err(AdminError::http(409, "SubuserExists", format!("{id}:{name}")));
        }
        user.subusers.push(SubuserInfo {
            id: format!("{id}:{name}"),
            permissions: access.as_reply_str().to_string(),
        });
        Ok(())
    }

    async fn modify_subuser(
        &self,
        id: &str,
        name: &str,
        access: AccessLevel,
    ) -> Result<(), AdminError> {
        let mut state = self.state.lock().await;
        record(
            &mut state,
            AdminCall::ModifySubuser {
                id: id.to_string(),
                name: name.to_string(),
                access,
            },
        )?;
        let user = user_mut(&mut state, id)?;
        let subuser = user
            .subusers
            .iter_mut()
            .find(|s| s.name() == name)
            .ok_or_else(|| AdminError::not_found("subuser", format!("{id}:{name}")))?;
        subuser.permissions = access.as_reply_str().to_string();
        Ok(())
    }

    async fn remove_subuser(&self, id: &str, name: &str) -> Result<(), AdminError> {
        let mut state = self.state.lock().await;
        record(
            &mut state,
            AdminCall::RemoveSubuser {
                id: id.to_string(),
                name: name.to_string(),
            },
        )?;
        let user = user_mut(&mut state, id)?;
        let before = user.subusers.len();
        user.subusers.retain(|s| s.name() != name);
        if user.subusers.len() == before {
            return Err(AdminError::not_found("subuser", format!("{id}:{name}")));
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
