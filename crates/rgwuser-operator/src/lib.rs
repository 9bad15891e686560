//! # rgwuser-operator
//!
//! Reconciles declared object-store users against an object gateway's admin
//! API. A pass runs the readiness gate, the gateway locator, the user and
//! subuser synchronizers, and finally the status reporter; see [`Reconciler`].

pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod locator;
pub mod observability;
pub mod readiness;
pub mod reconciler;
pub mod status;
pub mod sync;

pub use config::OperatorConfig;
pub use error::{ErrorCategory, ReconcileError, SyncError};
pub use locator::GatewayLocator;
pub use readiness::{Gate, NotReady, ReadinessGate};
pub use reconciler::{Collaborators, FinalizeOutcome, Reconciler};
pub use status::{ReconcileOutcome, StatusReporter};
pub use sync::{SubuserSynchronizer, UserSynchronizer};
