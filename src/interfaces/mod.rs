//! Abstract interfaces for order-service components.
//!
//! These traits define the contracts for:
//! - Order storage (staged, transactional persistence)
//! - Inventory service (stock adjustment)
//! - Identity service (login passthrough)

pub mod identity_client;
pub mod inventory_client;
pub mod order_store;

pub use identity_client::{IdentityClient, IdentityError, LoginForm, LoginResponse};
pub use inventory_client::{InventoryClient, InventoryError};
pub use order_store::{OrderStore, OrderTransaction, StorageError};
