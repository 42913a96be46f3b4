//! Inventory service client interface.

use async_trait::async_trait;

/// Errors surfaced by the inventory adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    #[error("failed to adjust stock for item {item_id}: {cause}")]
    AdjustmentFailed { item_id: i64, cause: String },
}

impl InventoryError {
    pub fn item_id(&self) -> i64 {
        match self {
            InventoryError::AdjustmentFailed { item_id, .. } => *item_id,
        }
    }
}

/// Interface for adjusting stock in the inventory service.
///
/// One call per invocation: no batching and no retries. Whether a failure
/// undoes anything is the caller's decision.
#[async_trait]
pub trait InventoryClient: Send + Sync {
    /// Decrement stock of `item_id` by `quantity`.
    ///
    /// `authorization` is the caller's `Authorization` header value and is
    /// forwarded as-is.
    async fn decrement_stock(
        &self,
        item_id: i64,
        quantity: i64,
        authorization: &str,
    ) -> Result<(), InventoryError>;
}
