use std::time::Duration;

use rgwuser_admin::ClientSettings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OperatorConfig {
    #[serde(default)]
    pub sync: SyncSettings,
    /// Admin API client settings
    #[serde(default)]
    pub admin: AdminSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl OperatorConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sync.default_max_buckets < -1 {
            return Err("sync.default_max_buckets must be >= -1".into());
        }
        if self.sync.not_ready_requeue.is_zero() {
            return Err("sync.not_ready_requeue must be > 0".into());
        }
        if self.sync.secret_prefix.trim().is_empty() {
            return Err("sync.secret_prefix must not be empty".into());
        }
        if self.sync.acceptable_health.is_empty() {
            return Err("sync.acceptable_health must list at least one health value".into());
        }
        if self.admin.request_timeout.is_zero() {
            return Err("admin.request_timeout must be > 0".into());
        }
        if self.admin.region.trim().is_empty() {
            return Err("admin.region must not be empty".into());
        }
        if self.admin.credentials_secret.trim().is_empty() {
            return Err("admin.credentials_secret must not be empty".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Bucket limit for users that do not declare `maxBuckets`.
    #[serde(default = "default_max_buckets")]
    pub default_max_buckets: i64,
    /// Fixed re-check interval while the cluster or gateway is not ready.
    #[serde(default = "default_not_ready_requeue", with = "humantime_serde")]
    pub not_ready_requeue: Duration,
    #[serde(default = "default_secret_prefix")]
    pub secret_prefix: String,
    #[serde(default = "default_acceptable_health")]
    pub acceptable_health: Vec<String>,
}

fn default_max_buckets() -> i64 {
    1000
}
fn default_not_ready_requeue() -> Duration {
    Duration::from_secs(10)
}
fn default_secret_prefix() -> String {
    "rook-ceph-object-user".into()
}
fn default_acceptable_health() -> Vec<String> {
    vec!["HEALTH_OK".into(), "HEALTH_WARN".into()]
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            default_max_buckets: default_max_buckets(),
            not_ready_requeue: default_not_ready_requeue(),
            secret_prefix: default_secret_prefix(),
            acceptable_health: default_acceptable_health(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSettings {
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
    #[serde(default = "default_region")]
    pub region: String,
    /// Secret in the store's namespace holding `AccessKey` / `SecretKey` of the admin-ops user.
    #[serde(default = "default_credentials_secret")]
    pub credentials_secret: String,
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(15)
}
fn default_region() -> String {
    "us-east-1".into()
}
fn default_credentials_secret() -> String {
    "rgw-admin-ops-user".into()
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            region: default_region(),
            credentials_secret: default_credentials_secret(),
            insecure_skip_verify: false,
        }
    }
}

impl AdminSettings {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            timeout: self.request_timeout,
            region: self.region.clone(),
            insecure_skip_verify: self.insecure_skip_verify,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::OperatorConfig;
    use config::{Config, Environment, File};
    use std::path::{Path, PathBuf};

    pub const DEFAULT_CONFIG_FILE: &str = "rgwuser.toml";

    pub fn load_config(path: Option<&str>) -> Result<OperatorConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if !pathbuf.exists() {
                    return Err(format!("config file not found: {p}"));
                }
                builder = builder.add_source(File::from(pathbuf));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // e.g. RGWUSER__SYNC__DEFAULT_MAX_BUCKETS=500
        builder = builder.add_source(
            Environment::with_prefix("RGWUSER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: OperatorConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }

    pub fn load_config_from_path<P: AsRef<Path>>(path: P) -> Result<OperatorConfig, String> {
        let p = path.as_ref().to_string_lossy().to_string();
        load_config(Some(&p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = OperatorConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.sync.default_max_buckets, 1000);
        assert_eq!(cfg.sync.not_ready_requeue, Duration::from_secs(10));
        assert_eq!(cfg.admin.client_settings().timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_validate_rejects_zero_requeue() {
        let mut cfg = OperatorConfig::default();
        cfg.sync.not_ready_requeue = Duration::ZERO;
        assert!(cfg.validate().unwrap_err().contains("not_ready_requeue"));
    }

    #[test]
    fn test_humantime_durations_parse() {
        let cfg: OperatorConfig = toml::from_str(
            r#"
[sync]
not_ready_requeue = "30s"

[admin]
request_timeout = "1m"
"#,
        )
        .unwrap();
        assert_eq!(cfg.sync.not_ready_requeue, Duration::from_secs(30));
        assert_eq!(cfg.admin.request_timeout, Duration::from_secs(60));
        assert_eq!(cfg.admin.region, "us-east-1");
    }
}
