//! Mock storage implementations for testing.

mod order_store;

pub use order_store::MockOrderStore;
