//! Order storage interface.

use async_trait::async_trait;

use crate::model::{ListOrders, NewOrderLine, Order, OrderId};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("order with id {0} not found")]
    NotFound(OrderId),

    #[error("Integrity violation: {0}")]
    Integrity(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db) = err.as_database_error() {
            if db.is_unique_violation() || db.is_foreign_key_violation() || db.is_check_violation()
            {
                return StorageError::Integrity(db.message().to_string());
            }
        }
        StorageError::Database(err)
    }
}

/// Interface for order persistence.
///
/// Reads only ever observe committed orders. Writes go through an
/// [`OrderTransaction`] obtained from [`OrderStore::begin`].
///
/// Implementations:
/// - `SqliteOrderStore`: SQLite storage
/// - `MockOrderStore`: in-memory, for tests
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Open a write transaction.
    async fn begin(&self) -> Result<Box<dyn OrderTransaction>>;

    /// Fetch a committed order with its lines.
    ///
    /// Fails with `StorageError::NotFound` if no such order is committed.
    async fn fetch_by_id(&self, order_id: OrderId) -> Result<Order>;

    /// Fetch committed orders sorted and truncated per `query`.
    ///
    /// Ties on the sort column are broken by ascending `order_id`.
    async fn fetch_all(&self, query: ListOrders) -> Result<Vec<Order>>;
}

/// A pending write set.
///
/// Staged orders are invisible to reads until `commit`. Dropping the
/// handle without committing discards them. Implementations must not hold
/// database locks between calls, since callers do remote work while a
/// handle is open.
#[async_trait]
pub trait OrderTransaction: Send {
    /// Stage a header and its lines, returning the allocated order id.
    ///
    /// `total_items` is set to `lines.len()` and lines are numbered from 1
    /// in input order. Nothing is visible outside the transaction until
    /// [`commit`](Self::commit).
    async fn stage_order(&mut self, user_id: i64, lines: &[NewOrderLine]) -> Result<OrderId>;

    /// Make every staged row visible atomically.
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discard every staged row.
    async fn rollback(self: Box<Self>) -> Result<()>;
}
