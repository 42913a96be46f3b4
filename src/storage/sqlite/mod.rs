//! SQLite implementations of storage interfaces.

mod order_store;

pub use order_store::SqliteOrderStore;
