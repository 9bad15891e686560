//! # rgwuser-core
//!
//! Domain types shared by the object-store user operator crates: the declared
//! user specification, byte quantities, the status surface, and the
//! collaborator contracts ([`ClusterInventory`], [`SecretStore`],
//! [`StatusStore`]) that the dispatch layer provides.

pub mod error;
pub mod inventory;
pub mod quantity;
pub mod spec;
pub mod status;
pub mod store;

pub use error::{CoreError, Result};
pub use inventory::{CephClusterInfo, ClusterInventory, ObjectStoreInfo, PodInfo, PodPhase};
pub use quantity::ByteQuantity;
pub use spec::{AccessLevel, CapabilitySpec, DesiredUserSpec, ObjectUser, QuotaSpec, SubuserSpec};
pub use status::{ObjectUserStatus, Phase, secret_name};
pub use store::{DynSecretStore, DynStatusStore, SecretStore, StatusStore};

/// Type alias for a shareable inventory instance.
pub type DynInventory = std::sync::Arc<dyn ClusterInventory>;
