//! Readiness gate: is the storage cluster usable at all?

use std::fmt;

use rgwuser_core::{CephClusterInfo, DynInventory, Result};

const READY_PHASE: &str = "Ready";

/// Result of a pipeline stage that may have to wait for its dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate<T> {
    Proceed(T),
    RetryLater(NotReady),
}

impl<T> Gate<T> {
    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed(_))
    }

    /// The reason for waiting, if any.
    pub fn not_ready(&self) -> Option<&NotReady> {
        match self {
            Self::Proceed(_) => None,
            Self::RetryLater(reason) => Some(reason),
        }
    }
}

/// Expected, transient dependency condition. Never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotReady {
    ClusterMissing { namespace: String },
    ClusterNotReady { cluster: String, phase: String },
    ClusterUnhealthy { cluster: String, health: Option<String> },
    StoreMissing { namespace: String, store: String },
    NoRunningGateway { store: String },
}

impl fmt::Display for NotReady {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClusterMissing { namespace } => {
                write!(f, "no storage cluster in namespace {namespace}")
            }
            Self::ClusterNotReady { cluster, phase } => {
                write!(f, "cluster {cluster} is in phase {phase:?}")
            }
            Self::ClusterUnhealthy { cluster, health } => match health {
                Some(health) => write!(f, "cluster {cluster} reports {health}"),
                None => write!(f, "cluster {cluster} has not reported health yet"),
            },
            Self::StoreMissing { namespace, store } => {
                write!(f, "object store {namespace}/{store} does not exist")
            }
            Self::NoRunningGateway { store } => {
                write!(f, "no running gateway pod for object store {store}")
            }
        }
    }
}

/// Evaluates the cluster rules in order: exists, phase Ready, acceptable health.
pub fn check_cluster(
    namespace: &str,
    cluster: Option<&CephClusterInfo>,
    acceptable_health: &[String],
) -> Gate<()> {
    let Some(cluster) = cluster else {
        return Gate::RetryLater(NotReady::ClusterMissing {
            namespace: namespace.to_string(),
        });
    };
    if !cluster.phase.eq_ignore_ascii_case(READY_PHASE) {
        return Gate::RetryLater(NotReady::ClusterNotReady {
            cluster: cluster.name.clone(),
            phase: cluster.phase.clone(),
        });
    }
    let healthy = cluster
        .health
        .as_deref()
        .is_some_and(|h| acceptable_health.iter().any(|ok| ok == h));
    if !healthy {
        return Gate::RetryLater(NotReady::ClusterUnhealthy {
            cluster: cluster.name.clone(),
            health: cluster.health.clone(),
        });
    }
    Gate::Proceed(())
}

pub struct ReadinessGate {
    inventory: DynInventory,
    acceptable_health: Vec<String>,
}

impl ReadinessGate {
    pub fn new(inventory: DynInventory, acceptable_health: Vec<String>) -> Self {
        Self {
            inventory,
            acceptable_health,
        }
    }

    /// Looks up the cluster of `namespace` and applies [`check_cluster`].
    pub async fn check(&self, namespace: &str) -> Result<Gate<()>> {
        let cluster = self.inventory.cluster(namespace).await?;
        let gate = check_cluster(namespace, cluster.as_ref(), &self.acceptable_health);
        if let Some(reason) = gate.not_ready() {
            tracing::info!(namespace = %namespace, reason = %reason, "cluster not ready, will retry");
        }
        Ok(gate)
    }
}
