//! Mock OrderStore implementation for testing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::model::{ListOrders, NewOrderLine, Order, OrderColumn, OrderId, OrderLine};
use crate::storage::{OrderStore, OrderTransaction, Result, StorageError};

#[derive(Default)]
struct Shared {
    committed: RwLock<BTreeMap<OrderId, Order>>,
    next_id: AtomicI64,
    fail_on_stage: AtomicBool,
    fail_on_commit: AtomicBool,
    hide_committed: AtomicBool,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
}

/// Mock order store that keeps committed orders in memory.
///
/// Staged orders live only inside their transaction object until commit.
#[derive(Clone, Default)]
pub struct MockOrderStore {
    shared: Arc<Shared>,
}

impl MockOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `stage_order` fail with an integrity violation.
    pub fn set_fail_on_stage(&self, fail: bool) {
        self.shared.fail_on_stage.store(fail, Ordering::SeqCst);
    }

    /// Make `commit` fail with a database error.
    pub fn set_fail_on_commit(&self, fail: bool) {
        self.shared.fail_on_commit.store(fail, Ordering::SeqCst);
    }

    /// Accept commits but drop the rows, so reads never see them.
    pub fn set_hide_committed(&self, hide: bool) {
        self.shared.hide_committed.store(hide, Ordering::SeqCst);
    }

    pub fn commit_count(&self) -> usize {
        self.shared.commits.load(Ordering::SeqCst)
    }

    pub fn rollback_count(&self) -> usize {
        self.shared.rollbacks.load(Ordering::SeqCst)
    }

    pub async fn committed_count(&self) -> usize {
        self.shared.committed.read().await.len()
    }
}

#[async_trait]
impl OrderStore for MockOrderStore {
    async fn begin(&self) -> Result<Box<dyn OrderTransaction>> {
        Ok(Box::new(MockOrderTransaction {
            shared: Arc::clone(&self.shared),
            staged: Vec::new(),
        }))
    }

    async fn fetch_by_id(&self, order_id: OrderId) -> Result<Order> {
        self.shared
            .committed
            .read()
            .await
            .get(&order_id)
            .cloned()
            .ok_or(StorageError::NotFound(order_id))
    }

    async fn fetch_all(&self, query: ListOrders) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self.shared.committed.read().await.values().cloned().collect();

        orders.sort_by(|a, b| {
            let primary = match query.order_by {
                OrderColumn::OrderId => a.order_id.cmp(&b.order_id),
                OrderColumn::TotalItems => a.total_items.cmp(&b.total_items),
                OrderColumn::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            let primary = if query.ascending {
                primary
            } else {
                primary.reverse()
            };
            primary.then(a.order_id.cmp(&b.order_id))
        });

        if let Some(limit) = query.limit {
            orders.truncate(limit as usize);
        }
        Ok(orders)
    }
}

struct MockOrderTransaction {
    shared: Arc<Shared>,
    staged: Vec<Order>,
}

#[async_trait]
impl OrderTransaction for MockOrderTransaction {
    async fn stage_order(&mut self, user_id: i64, lines: &[NewOrderLine]) -> Result<OrderId> {
        if self.shared.fail_on_stage.load(Ordering::SeqCst) {
            return Err(StorageError::Integrity("staging rejected".to_string()));
        }

        let order_id = self.shared.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let order_lines = lines
            .iter()
            .enumerate()
            .map(|(index, line)| OrderLine {
                order_id,
                line_number: index as i64 + 1,
                item_id: line.item_id,
                quantity: line.quantity,
                created_at: now,
                updated_at: None,
            })
            .collect();

        self.staged.push(Order {
            order_id,
            user_id,
            total_items: lines.len() as i64,
            created_at: now,
            updated_at: None,
            order_lines,
        });
        Ok(order_id)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        if self.shared.fail_on_commit.load(Ordering::SeqCst) {
            return Err(StorageError::Database(sqlx::Error::PoolClosed));
        }
        self.shared.commits.fetch_add(1, Ordering::SeqCst);
        if self.shared.hide_committed.load(Ordering::SeqCst) {
            return Ok(());
        }

        let mut committed = self.shared.committed.write().await;
        for order in self.staged {
            committed.insert(order.order_id, order);
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.shared.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
