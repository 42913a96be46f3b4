//! External service clients.

pub mod identity;
pub mod inventory;
pub mod mock;

pub use identity::HttpIdentityClient;
pub use inventory::HttpInventoryClient;
pub use mock::{MockIdentityClient, MockInventoryClient, StockCall};
