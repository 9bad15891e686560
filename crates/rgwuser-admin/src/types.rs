//! Wire types of the gateway user admin API.

use serde::{Deserialize, Serialize};

/// Limit value meaning "unlimited" in quota fields.
pub const UNLIMITED: i64 = -1;

/// A user record as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteUser {
    #[serde(rename = "user_id")]
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub suspended: i32,
    #[serde(default)]
    pub max_buckets: Option<i64>,
    #[serde(default)]
    pub subusers: Vec<SubuserInfo>,
    #[serde(default)]
    pub keys: Vec<UserKey>,
    #[serde(default)]
    pub caps: Vec<UserCap>,
    #[serde(default)]
    pub user_quota: QuotaSettings,
}

impl RemoteUser {
    /// The first S3 key pair, if the gateway generated one.
    pub fn primary_key(&self) -> Option<&UserKey> {
        self.keys.iter().find(|k| k.user == self.id).or(self.keys.first())
    }
}

/// A subuser entry in the user record. The id has the form `<uid>:<subuser>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubuserInfo {
    pub id: String,
    #[serde(default)]
    pub permissions: String,
}

impl SubuserInfo {
    /// Subuser name without the owning user prefix.
    pub fn name(&self) -> &str {
        self.id
            .split_once(':')
            .map(|(_, sub)| sub)
            .unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserKey {
    pub user: String,
    pub access_key: String,
    pub secret_key: String,
}

/// One explicit capability grant, e.g. `users=read`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCap {
    #[serde(rename = "type")]
    pub kind: String,
    pub perm: String,
}

/// Complete quota state; every write carries all fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaSettings {
    pub enabled: bool,
    #[serde(default = "unlimited")]
    pub max_objects: i64,
    #[serde(default = "unlimited")]
    pub max_size: i64,
}

fn unlimited() -> i64 {
    UNLIMITED
}

impl QuotaSettings {
    /// Quota disabled, both limits unlimited.
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            max_objects: UNLIMITED,
            max_size: UNLIMITED,
        }
    }
}

impl Default for QuotaSettings {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Attributes of a user to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub id: String,
    pub display_name: String,
    pub max_buckets: i64,
}

/// Attributes to change on an existing user; `None` fields are left alone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserChanges {
    pub display_name: Option<String>,
    pub max_buckets: Option<i64>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.max_buckets.is_none()
    }
}
