//! Synchronizers converging remote gateway state to a declared user.
//!
//! Neither synchronizer retries internally. A failed admin call surfaces as
//! [`SyncError::Admin`] and the dispatch layer re-runs the whole pass.

pub mod caps;
pub mod quota;
mod subusers;
mod user;

pub use crate::error::SyncError;
pub use subusers::{SubuserPlan, SubuserResult, SubuserSynchronizer};
pub use user::UserSynchronizer;
