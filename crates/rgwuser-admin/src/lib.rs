//! # rgwuser-admin
//!
//! The admin API adapter used by the object user synchronizers.
//!
//! [`AdminApi`] is the contract: get, create, modify and delete users, replace
//! quotas, grant and revoke capability strings, and manage subusers. A missing
//! user is reported as `Ok(None)` from [`AdminApi::get_user`] and as
//! [`AdminError::NotFound`] elsewhere, never as a generic failure.
//!
//! [`HttpAdminClient`] implements the contract over the gateway's signed
//! `/admin/user` HTTP resource. [`AdminClientFactory`] lets the caller decide
//! how a client is built for an endpoint:
//!
//! ```ignore
//! use rgwuser_admin::{AdminClientFactory, HttpAdminClientFactory, ClientSettings};
//!
//! let factory = HttpAdminClientFactory::new(ClientSettings::default());
//! let admin = factory.build(&endpoint_context)?;
//! if admin.get_user("my-user").await?.is_none() {
//!     // create it
//! }
//! ```

mod client;
mod error;
mod signing;
mod traits;
mod types;

pub use client::{ClientSettings, HttpAdminClient, HttpAdminClientFactory};
pub use error::{AdminError, AdminErrorCategory};
pub use traits::{AdminApi, AdminClientFactory, DynAdminApi, EndpointContext};
pub use types::{
    NewUser, QuotaSettings, RemoteUser, SubuserInfo, UNLIMITED, UserCap, UserChanges, UserKey,
};

/// Type alias for an admin API result.
pub type AdminResult<T> = Result<T, AdminError>;
