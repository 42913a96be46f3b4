//! Order creation workflow.
//!
//! Validating -> Staged -> AdjustingInventory -> Committed | RolledBack.
//!
//! The header and lines are staged locally but stay invisible to reads,
//! then stock is decremented remotely one line at a time in input order.
//! No database lock is held during the remote calls. The first
//! inventory failure rolls the local transaction back and stops; lines
//! after it are never sent. Stock already decremented for earlier lines is
//! not restored on the inventory side.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::interfaces::{InventoryClient, InventoryError, OrderStore, OrderTransaction, StorageError};
use crate::model::{NewOrderLine, OrderId};

/// Message returned with every successfully created order.
pub const ORDER_CREATED_MESSAGE: &str = "Order created successfully";

/// Result type for order operations.
pub type Result<T> = std::result::Result<T, OrderError>;

/// Errors surfaced by order operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("order with id {0} not found.")]
    NotFound(OrderId),

    #[error("Failed to update item quantity for item {item_id}: {cause}")]
    InventoryAdjustmentFailed { item_id: i64, cause: String },

    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),
}

impl From<StorageError> for OrderError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(id) => OrderError::NotFound(id),
            StorageError::Integrity(msg) => OrderError::IntegrityViolation(msg),
            other => OrderError::PersistenceFailure(other.to_string()),
        }
    }
}

impl From<InventoryError> for OrderError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::AdjustmentFailed { item_id, cause } => {
                OrderError::InventoryAdjustmentFailed { item_id, cause }
            }
        }
    }
}

/// Body of `POST /orders/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: i64,
    /// Accepted for compatibility; the stored value is always the line count.
    #[serde(default)]
    pub total_items: Option<i64>,
    pub order_lines: Vec<NewOrderLine>,
}

impl CreateOrderRequest {
    pub fn new(user_id: i64, order_lines: Vec<NewOrderLine>) -> Self {
        Self {
            user_id,
            total_items: None,
            order_lines,
        }
    }

    /// Shape checks performed before any storage or inventory work.
    pub fn validate(&self) -> Result<()> {
        if self.user_id <= 0 {
            return Err(OrderError::InvalidRequest(
                "user_id must be greater than 0".to_string(),
            ));
        }
        if matches!(self.total_items, Some(n) if n <= 0) {
            return Err(OrderError::InvalidRequest(
                "total_items must be greater than 0".to_string(),
            ));
        }
        if self.order_lines.is_empty() {
            return Err(OrderError::InvalidRequest(
                "order_lines list must contain at least one item".to_string(),
            ));
        }
        for (index, line) in self.order_lines.iter().enumerate() {
            if line.item_id <= 0 {
                return Err(OrderError::InvalidRequest(format!(
                    "order_lines[{}].item_id must be greater than 0",
                    index
                )));
            }
            if line.quantity <= 0 {
                return Err(OrderError::InvalidRequest(format!(
                    "order_lines[{}].quantity must be greater than 0",
                    index
                )));
            }
        }
        Ok(())
    }
}

/// Outcome of a committed order creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedOrder {
    pub message: String,
    #[serde(rename = "order")]
    pub order_id: OrderId,
}

/// Workflow states, used for logging transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationState {
    Validating,
    Staged,
    AdjustingInventory,
    Committed,
    RolledBack,
}

impl fmt::Display for CreationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CreationState::Validating => "validating",
            CreationState::Staged => "staged",
            CreationState::AdjustingInventory => "adjusting_inventory",
            CreationState::Committed => "committed",
            CreationState::RolledBack => "rolled_back",
        };
        f.write_str(name)
    }
}

/// Order creation orchestrator.
///
/// Coordinates the local order transaction with per-line inventory calls.
pub struct OrderCreationService {
    store: Arc<dyn OrderStore>,
    inventory: Arc<dyn InventoryClient>,
}

impl OrderCreationService {
    pub fn new(store: Arc<dyn OrderStore>, inventory: Arc<dyn InventoryClient>) -> Self {
        Self { store, inventory }
    }

    /// Run the full creation workflow.
    ///
    /// `authorization` is forwarded unchanged on every inventory call.
    #[tracing::instrument(
        name = "orders.create",
        skip_all,
        fields(user_id = request.user_id, lines = request.order_lines.len())
    )]
    pub async fn create_order(
        &self,
        request: &CreateOrderRequest,
        authorization: &str,
    ) -> Result<CreatedOrder> {
        debug!(state = %CreationState::Validating, "order creation started");
        request.validate().inspect_err(|e| {
            warn!(error = %e, "order request rejected");
        })?;

        let mut tx = self.store.begin().await.map_err(|e| {
            error!(error = %e, "failed to open order transaction");
            OrderError::from(e)
        })?;

        let order_id = match tx.stage_order(request.user_id, &request.order_lines).await {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, "failed to stage order");
                Self::roll_back(tx, None).await;
                return Err(e.into());
            }
        };
        debug!(order_id, state = %CreationState::Staged, "order staged");

        debug!(order_id, state = %CreationState::AdjustingInventory, "adjusting inventory");
        for (index, line) in request.order_lines.iter().enumerate() {
            if let Err(e) = self
                .inventory
                .decrement_stock(line.item_id, line.quantity, authorization)
                .await
            {
                warn!(
                    order_id,
                    line_number = index + 1,
                    item_id = line.item_id,
                    error = %e,
                    "inventory adjustment failed, abandoning order"
                );
                Self::roll_back(tx, Some(order_id)).await;
                return Err(e.into());
            }
        }

        // A failed commit drops the handle, which discards the staged rows.
        tx.commit().await.map_err(|e| {
            error!(order_id, error = %e, state = %CreationState::RolledBack, "order commit failed");
            OrderError::from(e)
        })?;
        debug!(order_id, state = %CreationState::Committed, "order committed");

        let order = self.store.fetch_by_id(order_id).await.map_err(|e| match e {
            StorageError::NotFound(_) => {
                error!(order_id, "committed order not visible on re-fetch");
                OrderError::InternalInconsistency(format!(
                    "order {} was committed but could not be read back",
                    order_id
                ))
            }
            other => {
                error!(order_id, error = %other, "failed to read back committed order");
                OrderError::from(other)
            }
        })?;

        info!(order_id = order.order_id, total_items = order.total_items, "order created");
        Ok(CreatedOrder {
            message: ORDER_CREATED_MESSAGE.to_string(),
            order_id: order.order_id,
        })
    }

    async fn roll_back(tx: Box<dyn OrderTransaction>, order_id: Option<OrderId>) {
        match tx.rollback().await {
            Ok(()) => debug!(?order_id, state = %CreationState::RolledBack, "order rolled back"),
            Err(e) => error!(?order_id, error = %e, "order rollback failed"),
        }
    }
}
