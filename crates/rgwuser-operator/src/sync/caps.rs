//! Capability strings.
//!
//! The admin API cannot edit a capability string in place. A change removes
//! the string applied before and then adds the new one. The previously applied
//! string is re-derived from the remote record on every pass, in the same
//! canonical order used to compose it. Permissions are normalized on both
//! sides because the gateway reports `read` plus `write` back as `*`.

use rgwuser_admin::UserCap;
use rgwuser_core::CapabilitySpec;

/// `users=<u>;buckets=<b>;...` for every set field, or `None` if nothing is set.
pub fn compose(spec: Option<&CapabilitySpec>) -> Option<String> {
    let entries = spec.map(CapabilitySpec::entries).unwrap_or_default();
    if entries.is_empty() {
        return None;
    }
    Some(
        entries
            .iter()
            .map(|(kind, perm)| format!("{kind}={};", normalize_perm(perm)))
            .collect(),
    )
}

/// Rebuilds the applied capability string from the remote cap list.
///
/// Known kinds come first in canonical order; unknown kinds follow in the
/// order the gateway reported them.
pub fn applied(remote: &[UserCap]) -> Option<String> {
    if remote.is_empty() {
        return None;
    }
    let known = CapabilitySpec::ORDER
        .iter()
        .filter_map(|kind| remote.iter().find(|c| c.kind == *kind));
    let unknown = remote
        .iter()
        .filter(|c| !CapabilitySpec::ORDER.contains(&c.kind.as_str()));
    Some(
        known
            .chain(unknown)
            .map(|c| format!("{}={};", c.kind, normalize_perm(&c.perm)))
            .collect(),
    )
}

/// Canonical form of a permission list: `*` for full access, otherwise the
/// single granted permission.
pub fn normalize_perm(perm: &str) -> String {
    let parts: Vec<&str> = perm
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    let has = |wanted: &str| parts.iter().any(|p| p.eq_ignore_ascii_case(wanted));
    if has("*") || (has("read") && has("write")) {
        return "*".to_string();
    }
    parts
        .iter()
        .map(|p| p.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join(",")
}

/// Calls needed to move from `previous` to `desired`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapsPlan {
    pub remove: Option<String>,
    pub add: Option<String>,
}

impl CapsPlan {
    pub fn new(previous: Option<String>, desired: Option<String>) -> Self {
        if previous == desired {
            return Self::default();
        }
        Self {
            remove: previous,
            add: desired,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.remove.is_none() && self.add.is_none()
    }
}
