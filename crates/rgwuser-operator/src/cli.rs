use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rgwuser_core::ObjectUser;
use rgwuser_memory::InventorySnapshot;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::reconciler::FinalizeOutcome;
use crate::status::ReconcileOutcome;

#[derive(Parser)]
#[command(name = "rgwuser-operator")]
#[command(about = "Reconcile object-store users against an object gateway admin API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (overrides RGWUSER_CONFIG, defaults to rgwuser.toml)
    #[arg(short, long, global = true, env = "RGWUSER_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one reconcile pass for a declared user
    Reconcile(PassArgs),
    /// Remove a declared user from its gateway
    Finalize(PassArgs),
}

#[derive(clap::Args)]
pub struct PassArgs {
    /// Cluster inventory snapshot (TOML or JSON)
    #[arg(long)]
    pub inventory: PathBuf,
    /// Declared object user (JSON or TOML)
    #[arg(long)]
    pub user: PathBuf,
    /// Access key of the gateway admin-ops user
    #[arg(long, env = "RGWUSER_ADMIN_ACCESS_KEY")]
    pub admin_access_key: String,
    /// Secret key of the gateway admin-ops user
    #[arg(long, env = "RGWUSER_ADMIN_SECRET_KEY", hide_env_values = true)]
    pub admin_secret_key: String,
}

/// Reads a TOML or JSON document, chosen by file extension.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        toml::from_str(&raw).with_context(|| format!("Invalid TOML in {}", path.display()))
    } else {
        serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
    }
}

pub fn read_inventory(path: &Path) -> Result<InventorySnapshot> {
    read_document(path)
}

pub fn read_user(path: &Path) -> Result<ObjectUser> {
    let user: ObjectUser = read_document(path)?;
    if user.namespace.is_empty() {
        anyhow::bail!("{}: namespace must not be empty", path.display());
    }
    Ok(user)
}

/// Printable form of a pass outcome.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeReport {
    pub phase: String,
    pub retry_requested: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requeue_after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,
}

impl From<&ReconcileOutcome> for OutcomeReport {
    fn from(outcome: &ReconcileOutcome) -> Self {
        Self {
            phase: outcome.phase.to_string(),
            retry_requested: outcome.retry_requested,
            requeue_after: outcome
                .requeue_after
                .map(|d| humantime_serde::re::humantime::format_duration(d).to_string()),
            reason: outcome.not_ready.as_ref().map(ToString::to_string),
            error: outcome.error.as_ref().map(ToString::to_string),
            secret_name: outcome.secret_name.clone(),
        }
    }
}

impl From<&FinalizeOutcome> for OutcomeReport {
    fn from(outcome: &FinalizeOutcome) -> Self {
        let (phase, retry_requested, requeue_after, error) = match outcome {
            FinalizeOutcome::Done => ("Deleted", false, None, None),
            FinalizeOutcome::RetryLater(after) => ("Pending", true, Some(*after), None),
            FinalizeOutcome::Failed(err) => ("Failed", err.is_retryable(), None, Some(err.to_string())),
        };
        Self {
            phase: phase.to_string(),
            retry_requested,
            requeue_after: requeue_after
                .map(|d| humantime_serde::re::humantime::format_duration(d).to_string()),
            reason: None,
            error,
            secret_name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_read_user_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.json");
        std::fs::write(
            &path,
            r#"{"namespace":"rook-ceph","spec":{"name":"my-user","store":"my-store","quota":{"maxSize":"10G"}}}"#,
        )
        .unwrap();

        let user = read_user(&path).unwrap();
        assert_eq!(user.spec.name, "my-user");
        assert_eq!(user.generation, 0);
        assert_eq!(
            user.spec.quota.and_then(|q| q.max_size).map(|s| s.bytes()),
            Some(10_000_000_000)
        );
    }

    #[test]
    fn test_read_user_requires_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.json");
        std::fs::write(&path, r#"{"namespace":"","spec":{"name":"u","store":"s"}}"#).unwrap();
        assert!(read_user(&path).is_err());
    }
}
