use rgwuser_admin::{QuotaSettings, UNLIMITED};
use rgwuser_core::QuotaSpec;

/// Full quota state to transmit for a declared quota.
///
/// The gateway has no partial quota update, so the result always carries the
/// enabled flag and both limits. Unset limits become [`UNLIMITED`].
pub fn desired_quota(spec: Option<&QuotaSpec>) -> QuotaSettings {
    let Some(spec) = spec else {
        return QuotaSettings::disabled();
    };
    if spec.max_objects.is_none() && spec.max_size.is_none() {
        return QuotaSettings::disabled();
    }
    QuotaSettings {
        enabled: true,
        max_objects: spec.max_objects.unwrap_or(UNLIMITED),
        max_size: spec.max_size.map(|q| q.as_i64()).unwrap_or(UNLIMITED),
    }
}
