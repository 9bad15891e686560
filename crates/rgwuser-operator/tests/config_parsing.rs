use std::io::Write;
use std::time::Duration;

use rgwuser_operator::config::loader::{load_config, load_config_from_path};
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn file_values_override_defaults() {
    let file = write_config(
        r#"
[sync]
default_max_buckets = 500
not_ready_requeue = "30s"
secret_prefix = "object-user"
acceptable_health = ["HEALTH_OK"]

[admin]
request_timeout = "5s"
credentials_secret = "rgw-admin"

[logging]
level = "debug"
"#,
    );

    let cfg = load_config_from_path(file.path()).expect("valid config");
    assert_eq!(cfg.sync.default_max_buckets, 500);
    assert_eq!(cfg.sync.not_ready_requeue, Duration::from_secs(30));
    assert_eq!(cfg.sync.secret_prefix, "object-user");
    assert_eq!(cfg.sync.acceptable_health, vec!["HEALTH_OK".to_string()]);
    assert_eq!(cfg.admin.request_timeout, Duration::from_secs(5));
    assert_eq!(cfg.admin.credentials_secret, "rgw-admin");
    assert_eq!(cfg.admin.region, "us-east-1");
    assert_eq!(cfg.logging.level, "debug");
}

#[test]
fn partial_file_keeps_section_defaults() {
    let file = write_config("[logging]\nlevel = \"warn\"\n");
    let cfg = load_config_from_path(file.path()).expect("valid config");
    assert_eq!(cfg.sync.default_max_buckets, 1000);
    assert_eq!(cfg.sync.secret_prefix, "rook-ceph-object-user");
    assert_eq!(cfg.admin.credentials_secret, "rgw-admin-ops-user");
}

#[test]
fn invalid_values_are_rejected() {
    let file = write_config("[sync]\ndefault_max_buckets = -5\n");
    let err = load_config_from_path(file.path()).unwrap_err();
    assert!(err.contains("default_max_buckets"), "unexpected error: {err}");
}

#[test]
fn malformed_duration_is_rejected() {
    let file = write_config("[admin]\nrequest_timeout = \"soon\"\n");
    let err = load_config_from_path(file.path()).unwrap_err();
    assert!(err.contains("deserialize"), "unexpected error: {err}");
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("absent.toml");
    let err = load_config(Some(&missing.to_string_lossy())).unwrap_err();
    assert!(err.contains("not found"));
}
