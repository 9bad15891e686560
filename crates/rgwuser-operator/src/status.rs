//! Status reporter: maps a pass outcome to a phase and a retry decision.

use std::time::Duration;

use rgwuser_core::{DynStatusStore, ObjectUser, ObjectUserStatus, Phase, secret_name};

use crate::error::ReconcileError;
use crate::readiness::NotReady;

/// Result of one reconcile pass as seen by the dispatch layer.
#[derive(Debug)]
pub struct ReconcileOutcome {
    pub phase: Phase,
    pub retry_requested: bool,
    /// Fixed re-check delay; `None` leaves the delay to the dispatcher's backoff.
    pub requeue_after: Option<Duration>,
    pub error: Option<ReconcileError>,
    pub not_ready: Option<NotReady>,
    pub secret_name: Option<String>,
}

impl ReconcileOutcome {
    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn status(&self, observed_generation: i64) -> ObjectUserStatus {
        ObjectUserStatus {
            phase: self.phase,
            secret_name: self.secret_name.clone(),
            observed_generation,
        }
    }
}

pub struct StatusReporter {
    store: DynStatusStore,
    secret_prefix: String,
    not_ready_requeue: Duration,
}

impl StatusReporter {
    pub fn new(store: DynStatusStore, secret_prefix: impl Into<String>, not_ready_requeue: Duration) -> Self {
        Self {
            store,
            secret_prefix: secret_prefix.into(),
            not_ready_requeue,
        }
    }

    /// Name of the credentials secret for `user`.
    pub fn secret_name(&self, user: &ObjectUser) -> String {
        secret_name(&self.secret_prefix, &user.spec.store, &user.spec.name)
    }

    pub fn ready(&self, user: &ObjectUser) -> ReconcileOutcome {
        ReconcileOutcome {
            phase: Phase::Ready,
            retry_requested: false,
            requeue_after: None,
            error: None,
            not_ready: None,
            secret_name: Some(self.secret_name(user)),
        }
    }

    pub fn pending(&self, reason: NotReady) -> ReconcileOutcome {
        ReconcileOutcome {
            phase: Phase::Pending,
            retry_requested: true,
            requeue_after: Some(self.not_ready_requeue),
            error: None,
            not_ready: Some(reason),
            secret_name: None,
        }
    }

    /// Terminal for invalid declarations, backoff retry for everything else.
    pub fn failed(&self, error: ReconcileError) -> ReconcileOutcome {
        ReconcileOutcome {
            phase: Phase::Failed,
            retry_requested: error.is_retryable(),
            requeue_after: None,
            error: Some(error),
            not_ready: None,
            secret_name: None,
        }
    }

    /// Persists the outcome as the user's status.
    pub async fn persist(&self, user: &ObjectUser, outcome: &ReconcileOutcome) -> Result<(), ReconcileError> {
        let status = outcome.status(user.generation);
        self.store
            .update(&user.namespace, &user.spec.name, &status)
            .await?;
        tracing::debug!(user = %user.key(), phase = %status.phase, "status updated");
        Ok(())
    }
}
