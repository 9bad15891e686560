//! One reconcile pass: readiness gate, gateway locator, user synchronizer,
//! subuser synchronizer, status reporter.

use std::sync::Arc;
use std::time::Duration;

use rgwuser_admin::{AdminClientFactory, EndpointContext};
use rgwuser_core::{DynInventory, DynSecretStore, DynStatusStore, ObjectUser};
use tracing::instrument;

use crate::config::OperatorConfig;
use crate::credentials::CredentialPublisher;
use crate::error::ReconcileError;
use crate::locator::GatewayLocator;
use crate::readiness::{Gate, NotReady, ReadinessGate};
use crate::status::{ReconcileOutcome, StatusReporter};
use crate::sync::{SubuserSynchronizer, UserSynchronizer};

/// Everything a [`Reconciler`] talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub inventory: DynInventory,
    pub secrets: DynSecretStore,
    pub statuses: DynStatusStore,
    pub admin_factory: Arc<dyn AdminClientFactory>,
}

/// Outcome of removing a declared user.
#[derive(Debug)]
pub enum FinalizeOutcome {
    Done,
    RetryLater(Duration),
    Failed(ReconcileError),
}

enum Pass {
    NotReady(NotReady),
    Synced,
}

pub struct Reconciler {
    default_max_buckets: i64,
    not_ready_requeue: Duration,
    gate: ReadinessGate,
    locator: GatewayLocator,
    admin_factory: Arc<dyn AdminClientFactory>,
    credentials: CredentialPublisher,
    reporter: StatusReporter,
}

impl Reconciler {
    pub fn new(config: &OperatorConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            inventory,
            secrets,
            statuses,
            admin_factory,
        } = collaborators;
        Self {
            default_max_buckets: config.sync.default_max_buckets,
            not_ready_requeue: config.sync.not_ready_requeue,
            gate: ReadinessGate::new(inventory.clone(), config.sync.acceptable_health.clone()),
            locator: GatewayLocator::new(
                inventory,
                secrets.clone(),
                config.admin.credentials_secret.clone(),
            ),
            admin_factory,
            credentials: CredentialPublisher::new(secrets),
            reporter: StatusReporter::new(
                statuses,
                config.sync.secret_prefix.clone(),
                config.sync.not_ready_requeue,
            ),
        }
    }

    /// Runs one pass for `user` and persists the resulting status.
    #[instrument(skip(self, user), fields(user = %user.key()))]
    pub async fn reconcile(&self, user: &ObjectUser) -> ReconcileOutcome {
        let outcome = match self.run(user).await {
            Ok(Pass::Synced) => {
                tracing::info!("object store user reconciled");
                self.reporter.ready(user)
            }
            Ok(Pass::NotReady(reason)) => self.reporter.pending(reason),
            Err(err) => {
                tracing::error!(error = %err, category = %err.category(), "reconcile failed");
                self.reporter.failed(err)
            }
        };

        match self.reporter.persist(user, &outcome).await {
            Ok(()) => outcome,
            Err(err) => {
                tracing::error!(error = %err, "failed to persist status");
                self.reporter.failed(err)
            }
        }
    }

    async fn run(&self, user: &ObjectUser) -> Result<Pass, ReconcileError> {
        let ctx = match self.prepare(user).await? {
            Gate::Proceed(ctx) => ctx,
            Gate::RetryLater(reason) => return Ok(Pass::NotReady(reason)),
        };
        let admin = self.admin_factory.build(&ctx)?;
        tracing::debug!(backend = admin.backend_name(), endpoint = %ctx.endpoint, "admin client ready");

        let remote = UserSynchronizer::new(admin.clone(), self.default_max_buckets)
            .create_or_update(&user.spec)
            .await?;
        SubuserSynchronizer::new(admin)
            .sync(&user.spec.name, &user.spec.subusers, &remote.subusers)
            .await?;

        self.credentials
            .publish(
                &user.namespace,
                &self.reporter.secret_name(user),
                &remote,
                &ctx.endpoint,
            )
            .await?;
        Ok(Pass::Synced)
    }

    /// Readiness gate followed by the gateway locator.
    async fn prepare(&self, user: &ObjectUser) -> Result<Gate<EndpointContext>, ReconcileError> {
        if let Gate::RetryLater(reason) = self.gate.check(&user.namespace).await? {
            return Ok(Gate::RetryLater(reason));
        }
        self.locator.locate(&user.namespace, &user.spec.store).await
    }

    /// Removes the remote user and its published credentials.
    ///
    /// A store or gateway that no longer exists completes finalization without
    /// any remote call. A user already absent remotely counts as removed.
    #[instrument(skip(self, user), fields(user = %user.key()))]
    pub async fn finalize(&self, user: &ObjectUser) -> FinalizeOutcome {
        match self.remove(user).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(error = %err, "finalize failed");
                FinalizeOutcome::Failed(err)
            }
        }
    }

    async fn remove(&self, user: &ObjectUser) -> Result<FinalizeOutcome, ReconcileError> {
        if let Gate::RetryLater(reason) = self.gate.check(&user.namespace).await? {
            tracing::info!(reason = %reason, "cannot remove user yet");
            return Ok(FinalizeOutcome::RetryLater(self.not_ready_requeue));
        }
        let ctx = match self.locator.locate(&user.namespace, &user.spec.store).await? {
            Gate::Proceed(ctx) => ctx,
            Gate::RetryLater(reason) => {
                tracing::info!(reason = %reason, "gateway gone, nothing to remove");
                return Ok(FinalizeOutcome::Done);
            }
        };

        let admin = self.admin_factory.build(&ctx)?;
        match admin.delete_user(&user.spec.name, true).await {
            Ok(()) => tracing::info!("object store user deleted"),
            Err(e) if e.is_not_found() => tracing::debug!("object store user already absent"),
            Err(e) => return Err(e.into()),
        }
        self.credentials
            .revoke(&user.namespace, &self.reporter.secret_name(user))
            .await?;
        Ok(FinalizeOutcome::Done)
    }
}
