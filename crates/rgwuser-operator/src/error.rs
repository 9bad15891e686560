//! Error taxonomy of a reconcile pass.
//!
//! "Not ready" conditions are not errors and never appear here; they travel
//! as [`crate::Gate::RetryLater`]. Missing remote users or subusers are
//! handled inside the synchronizers and never surface either.

use rgwuser_admin::{AdminError, AdminErrorCategory};
use rgwuser_core::CoreError;
use thiserror::Error;

/// Failure of the user or subuser synchronizer.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Invalid object user specification: {0}")]
    InvalidSpecification(String),

    #[error("Admin API call failed: {0}")]
    Admin(#[from] AdminError),

    #[error("Credential publication failed: {0}")]
    Secret(String),
}

impl SyncError {
    pub fn invalid_specification(message: impl Into<String>) -> Self {
        Self::InvalidSpecification(message.into())
    }

    pub fn secret(message: impl Into<String>) -> Self {
        Self::Secret(message.into())
    }

    /// Converts a validation failure, keeping only its message.
    pub fn from_validation(err: CoreError) -> Self {
        match err {
            CoreError::InvalidSpecification(message) => Self::InvalidSpecification(message),
            other => Self::InvalidSpecification(other.to_string()),
        }
    }
}

/// Failure of a whole reconcile or finalize pass.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("Gateway admin credentials unavailable: {0}")]
    Credentials(String),

    /// Inventory, secret store or status store failure.
    #[error("Collaborator failure: {0}")]
    Collaborator(#[from] CoreError),
}

impl From<AdminError> for ReconcileError {
    fn from(err: AdminError) -> Self {
        Self::Sync(SyncError::Admin(err))
    }
}

/// Coarse classification used for logging and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The declared specification is unusable; backoff retries cannot fix it.
    Validation,
    /// The gateway admin API failed or returned something unexpected.
    Adapter,
    /// The orchestration platform (inventory, secrets, status) failed.
    Infrastructure,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Adapter => write!(f, "adapter"),
            Self::Infrastructure => write!(f, "infrastructure"),
        }
    }
}

impl ReconcileError {
    pub fn credentials(message: impl Into<String>) -> Self {
        Self::Credentials(message.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Sync(SyncError::InvalidSpecification(_)) => ErrorCategory::Validation,
            Self::Sync(SyncError::Admin(err)) => match err.category() {
                AdminErrorCategory::Request => ErrorCategory::Infrastructure,
                _ => ErrorCategory::Adapter,
            },
            Self::Sync(SyncError::Secret(_)) => ErrorCategory::Adapter,
            Self::Credentials(_) => ErrorCategory::Infrastructure,
            Self::Collaborator(err) if err.is_specification_error() => ErrorCategory::Validation,
            Self::Collaborator(_) => ErrorCategory::Infrastructure,
        }
    }

    /// Whether the dispatch layer should retry this pass with backoff.
    pub fn is_retryable(&self) -> bool {
        self.category() != ErrorCategory::Validation
    }
}
