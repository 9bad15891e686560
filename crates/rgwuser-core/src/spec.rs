//! Declared object-store user state.
//!
//! A [`DesiredUserSpec`] is supplied anew on every reconcile pass; nothing in
//! here is persisted between passes.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::quantity::ByteQuantity;

/// Declared state of one object-store user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesiredUserSpec {
    /// Stable identity key; also the gateway user id.
    pub name: String,
    /// Object store (gateway) the user lives in.
    pub store: String,
    #[serde(default)]
    pub display_name: String,
    /// Absent means the configured provider default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_buckets: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<QuotaSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<CapabilitySpec>,
    #[serde(default)]
    pub subusers: Vec<SubuserSpec>,
}

impl DesiredUserSpec {
    pub fn new(name: impl Into<String>, store: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store: store.into(),
            ..Default::default()
        }
    }

    pub fn with_quota(mut self, quota: QuotaSpec) -> Self {
        self.quota = Some(quota);
        self
    }

    pub fn with_capabilities(mut self, capabilities: CapabilitySpec) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    pub fn with_subuser(mut self, name: impl Into<String>, access: AccessLevel) -> Self {
        self.subusers.push(SubuserSpec {
            name: name.into(),
            access,
        });
        self
    }

    /// Display name sent to the gateway; falls back to the identity key.
    pub fn effective_display_name(&self) -> &str {
        if self.display_name.is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }

    /// Checks the invariants the synchronizer relies on before any remote call.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(CoreError::invalid_specification("user name must not be empty"));
        }
        if self.name.contains(':') {
            return Err(CoreError::invalid_specification(format!(
                "user name {:?} must not contain ':'",
                self.name
            )));
        }
        if let Some(max) = self.max_buckets
            && max < -1
        {
            return Err(CoreError::invalid_specification(format!(
                "maxBuckets must be >= -1, got {max}"
            )));
        }
        if let Some(quota) = &self.quota
            && let Some(objects) = quota.max_objects
            && objects < 0
        {
            return Err(CoreError::invalid_specification(format!(
                "quota.maxObjects must not be negative, got {objects}"
            )));
        }

        let mut seen = HashSet::new();
        for subuser in &self.subusers {
            if subuser.name.is_empty() {
                return Err(CoreError::invalid_specification("subuser name must not be empty"));
            }
            if !seen.insert(subuser.name.as_str()) {
                return Err(CoreError::invalid_specification(format!(
                    "duplicate subuser name {:?}",
                    subuser.name
                )));
            }
        }
        Ok(())
    }
}

/// User quota limits. Either, both, or neither may be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_objects: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<ByteQuantity>,
}

/// Explicit administrative capabilities granted to the user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

impl CapabilitySpec {
    /// Capability types in the order the gateway string is composed.
    pub const ORDER: [&'static str; 5] = ["users", "buckets", "metadata", "usage", "zone"];

    pub fn users_and_buckets(user: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            bucket: Some(bucket.into()),
            ..Default::default()
        }
    }

    /// `(type, permission)` pairs for every set, non-empty field, in [`Self::ORDER`].
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        let fields = [
            &self.user,
            &self.bucket,
            &self.metadata,
            &self.usage,
            &self.zone,
        ];
        Self::ORDER
            .iter()
            .zip(fields)
            .filter_map(|(kind, perm)| {
                perm.as_deref()
                    .filter(|p| !p.is_empty())
                    .map(|p| (*kind, p))
            })
            .collect()
    }
}

/// A named sub-identity of the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubuserSpec {
    pub name: String,
    #[serde(default)]
    pub access: AccessLevel,
}

/// Subuser permission level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    #[default]
    None,
    Read,
    Write,
    #[serde(alias = "read-write")]
    ReadWrite,
    #[serde(alias = "full-control")]
    Full,
}

impl AccessLevel {
    /// Token sent in admin API requests.
    pub fn as_request_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Read => "read",
            Self::Write => "write",
            Self::ReadWrite => "readwrite",
            Self::Full => "full",
        }
    }

    /// Token the gateway reports back in user info replies.
    pub fn as_reply_str(self) -> &'static str {
        match self {
            Self::None => "<none>",
            Self::Read => "read",
            Self::Write => "write",
            Self::ReadWrite => "read-write",
            Self::Full => "full-control",
        }
    }

    /// Parses either a request or a reply token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "" | "none" | "<none>" => Some(Self::None),
            "read" => Some(Self::Read),
            "write" => Some(Self::Write),
            "readwrite" | "read-write" => Some(Self::ReadWrite),
            "full" | "full-control" => Some(Self::Full),
            _ => None,
        }
    }
}

impl FromStr for AccessLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_token(s).ok_or_else(|| CoreError::InvalidAccessLevel(s.to_string()))
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            other => other.as_request_str(),
        };
        f.write_str(s)
    }
}

/// The declared object user resource as handed over by the dispatch layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectUser {
    pub namespace: String,
    #[serde(default)]
    pub generation: i64,
    /// Set once the declaration has been removed and the user must be cleaned up.
    #[serde(default)]
    pub deletion_requested: bool,
    pub spec: DesiredUserSpec,
}

impl ObjectUser {
    pub fn new(namespace: impl Into<String>, spec: DesiredUserSpec) -> Self {
        Self {
            namespace: namespace.into(),
            generation: 1,
            deletion_requested: false,
            spec,
        }
    }

    /// `namespace/name`, used as a log and storage key.
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace, self.spec.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_name() {
        let spec = DesiredUserSpec::new("", "my-store");
        let err = spec.validate().unwrap_err();
        assert!(err.is_specification_error());
    }

    #[test]
    fn test_validate_rejects_duplicate_subusers() {
        let spec = DesiredUserSpec::new("my-user", "my-store")
            .with_subuser("swift", AccessLevel::Read)
            .with_subuser("swift", AccessLevel::Write);
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_limits() {
        let mut spec = DesiredUserSpec::new("my-user", "my-store");
        spec.max_buckets = Some(-5);
        assert!(spec.validate().is_err());

        let spec = DesiredUserSpec::new("my-user", "my-store").with_quota(QuotaSpec {
            max_objects: Some(-1),
            max_size: None,
        });
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_minimal_spec() {
        let spec = DesiredUserSpec::new("my-user", "my-store");
        assert!(spec.validate().is_ok());
        assert_eq!(spec.effective_display_name(), "my-user");
    }

    #[test]
    fn test_capability_entries_skip_unset_fields() {
        let caps = CapabilitySpec {
            bucket: Some("read".into()),
            zone: Some("*".into()),
            user: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(caps.entries(), vec![("buckets", "read"), ("zone", "*")]);
    }

    #[test]
    fn test_access_level_tokens() {
        for level in [
            AccessLevel::None,
            AccessLevel::Read,
            AccessLevel::Write,
            AccessLevel::ReadWrite,
            AccessLevel::Full,
        ] {
            assert_eq!(AccessLevel::from_token(level.as_request_str()), Some(level));
            assert_eq!(AccessLevel::from_token(level.as_reply_str()), Some(level));
        }
        assert!("admin".parse::<AccessLevel>().is_err());
    }

    #[test]
    fn test_deserialize_object_user() {
        let json = r#"{
            "namespace": "rook-ceph",
            "generation": 3,
            "spec": {
                "name": "my-user",
                "store": "my-store",
                "quota": {"maxObjects": 10000, "maxSize": "10G"},
                "capabilities": {"user": "read", "bucket": "read"},
                "subusers": [{"name": "swift", "access": "full"}]
            }
        }"#;
        let user: ObjectUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.key(), "rook-ceph/my-user");
        assert_eq!(user.generation, 3);
        assert!(!user.deletion_requested);
        let quota = user.spec.quota.unwrap();
        assert_eq!(quota.max_objects, Some(10000));
        assert_eq!(quota.max_size.map(ByteQuantity::bytes), Some(10_000_000_000));
        assert_eq!(user.spec.subusers[0].access, AccessLevel::Full);
    }
}
