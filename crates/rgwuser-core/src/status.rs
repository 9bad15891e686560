//! Persisted status surface of an object user.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Dependencies not usable yet; a re-check is scheduled.
    #[default]
    Pending,
    Ready,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Ready => write!(f, "Ready"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectUserStatus {
    pub phase: Phase,
    /// Name of the secret holding the user's credentials; only set once Ready.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,
    #[serde(default)]
    pub observed_generation: i64,
}

/// Deterministic name of the credentials secret: `<prefix>-<store>-<name>`.
pub fn secret_name(prefix: &str, store: &str, name: &str) -> String {
    format!("{prefix}-{store}-{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_name() {
        assert_eq!(
            secret_name("rook-ceph-object-user", "my-store", "my-user"),
            "rook-ceph-object-user-my-store-my-user"
        );
    }

    #[test]
    fn test_status_serialization() {
        let status = ObjectUserStatus {
            phase: Phase::Ready,
            secret_name: Some("rook-ceph-object-user-my-store-my-user".into()),
            observed_generation: 2,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["phase"], "Ready");
        assert_eq!(json["secretName"], "rook-ceph-object-user-my-store-my-user");
        assert_eq!(json["observedGeneration"], 2);

        let pending = ObjectUserStatus::default();
        let json = serde_json::to_value(&pending).unwrap();
        assert_eq!(json["phase"], "Pending");
        assert!(json.get("secretName").is_none());
    }
}
