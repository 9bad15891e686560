//! In-memory implementations of the operator's collaborators.
//!
//! [`InMemoryGateway`] stands in for an object gateway's admin API and records
//! every call it receives. [`InMemoryInventory`], [`InMemorySecretStore`] and
//! [`InMemoryStatusStore`] stand in for the orchestration platform.
//!
//! # Example
//!
//! ```ignore
//! use rgwuser_memory::InMemoryGateway;
//! use rgwuser_admin::AdminApi;
//!
//! let gateway = InMemoryGateway::new();
//! assert!(gateway.get_user("my-user").await?.is_none());
//! ```

pub mod factory;
pub mod gateway;
pub mod inventory;
pub mod stores;

pub use factory::InMemoryGatewayFactory;
pub use gateway::{AdminCall, CallKind, InMemoryGateway};
pub use inventory::{InMemoryInventory, InventorySnapshot};
pub use stores::{InMemorySecretStore, InMemoryStatusStore};
