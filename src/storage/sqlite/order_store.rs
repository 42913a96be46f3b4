//! SQLite OrderStore implementation.
//!
//! Staging, commit and rollback each run in their own short SQLite
//! transaction. Between them a staged header carries `status = 'staged'`
//! and is filtered out of every read, so no write lock is held while the
//! caller waits on remote work.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_query::{Expr, Order as SortOrder, Query, SqliteQueryBuilder};
use sea_query_binder::SqlxBinder;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, warn};

use crate::model::{ListOrders, NewOrderLine, Order, OrderColumn, OrderId, OrderLine};
use crate::storage::helpers::{format_timestamp, parse_optional_timestamp, parse_timestamp};
use crate::storage::schema::{
    OrderHeaders, OrderLines, CREATE_ORDER_HEADERS_TABLE, CREATE_ORDER_LINES_TABLE,
    PURGE_STAGED_ORDERS, STATUS_COMMITTED, STATUS_STAGED,
};
use crate::storage::{OrderStore, OrderTransaction, Result, StorageError};

/// SQLite implementation of OrderStore.
pub struct SqliteOrderStore {
    pool: SqlitePool,
}

impl SqliteOrderStore {
    /// Create a new SQLite order store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create tables if they don't exist and drop staged orders a previous
    /// process never finished.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::raw_sql(CREATE_ORDER_HEADERS_TABLE)
            .execute(&self.pool)
            .await?;
        sqlx::raw_sql(CREATE_ORDER_LINES_TABLE)
            .execute(&self.pool)
            .await?;

        let purged = sqlx::raw_sql(PURGE_STAGED_ORDERS)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if purged > 0 {
            warn!(rows = purged, "purged abandoned staged orders");
        }
        Ok(())
    }

    /// Lines for the given orders, grouped by order id, each group sorted
    /// by line number.
    async fn fetch_lines(&self, order_ids: &[OrderId]) -> Result<HashMap<OrderId, Vec<OrderLine>>> {
        let mut grouped: HashMap<OrderId, Vec<OrderLine>> = HashMap::new();
        if order_ids.is_empty() {
            return Ok(grouped);
        }

        let (sql, values) = Query::select()
            .columns([
                OrderLines::OrderId,
                OrderLines::LineNumber,
                OrderLines::ItemId,
                OrderLines::Quantity,
                OrderLines::CreatedAt,
                OrderLines::UpdatedAt,
            ])
            .from(OrderLines::Table)
            .and_where(Expr::col(OrderLines::OrderId).is_in(order_ids.iter().copied()))
            .order_by(OrderLines::OrderId, SortOrder::Asc)
            .order_by(OrderLines::LineNumber, SortOrder::Asc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        for row in rows {
            let line = line_from_row(&row)?;
            grouped.entry(line.order_id).or_default().push(line);
        }

        Ok(grouped)
    }
}

fn line_from_row(row: &SqliteRow) -> Result<OrderLine> {
    let created_at: String = row.try_get("created_at")?;
    let updated_at: Option<String> = row.try_get("updated_at")?;
    Ok(OrderLine {
        order_id: row.try_get("order_id")?,
        line_number: row.try_get("line_number")?,
        item_id: row.try_get("item_id")?,
        quantity: row.try_get("quantity")?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_optional_timestamp(updated_at.as_deref())?,
    })
}

/// Header columns only; lines are attached afterwards.
fn header_from_row(row: &SqliteRow) -> Result<Order> {
    let created_at: String = row.try_get("created_at")?;
    let updated_at: Option<String> = row.try_get("updated_at")?;
    Ok(Order {
        order_id: row.try_get("order_id")?,
        user_id: row.try_get("user_id")?,
        total_items: row.try_get("total_items")?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_optional_timestamp(updated_at.as_deref())?,
        order_lines: Vec::new(),
    })
}

/// Committed headers only.
fn header_select() -> sea_query::SelectStatement {
    Query::select()
        .columns([
            OrderHeaders::OrderId,
            OrderHeaders::UserId,
            OrderHeaders::TotalItems,
            OrderHeaders::CreatedAt,
            OrderHeaders::UpdatedAt,
        ])
        .from(OrderHeaders::Table)
        .and_where(Expr::col(OrderHeaders::Status).eq(STATUS_COMMITTED))
        .to_owned()
}

/// Delete staged headers and their lines.
async fn discard_staged(pool: &SqlitePool, order_ids: &[OrderId]) -> Result<()> {
    let mut tx = pool.begin().await?;

    let (sql, values) = Query::delete()
        .from_table(OrderLines::Table)
        .and_where(Expr::col(OrderLines::OrderId).is_in(order_ids.iter().copied()))
        .build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(&mut *tx).await?;

    let (sql, values) = Query::delete()
        .from_table(OrderHeaders::Table)
        .and_where(Expr::col(OrderHeaders::OrderId).is_in(order_ids.iter().copied()))
        .and_where(Expr::col(OrderHeaders::Status).eq(STATUS_STAGED))
        .build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(&mut *tx).await?;

    tx.commit().await?;
    Ok(())
}

#[async_trait]
impl OrderStore for SqliteOrderStore {
    async fn begin(&self) -> Result<Box<dyn OrderTransaction>> {
        Ok(Box::new(SqliteOrderTransaction {
            pool: self.pool.clone(),
            pending: Vec::new(),
        }))
    }

    async fn fetch_by_id(&self, order_id: OrderId) -> Result<Order> {
        let (sql, values) = header_select()
            .and_where(Expr::col(OrderHeaders::OrderId).eq(order_id))
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound(order_id))?;

        let mut order = header_from_row(&row)?;
        order.order_lines = self
            .fetch_lines(&[order_id])
            .await?
            .remove(&order_id)
            .unwrap_or_default();

        Ok(order)
    }

    async fn fetch_all(&self, query: ListOrders) -> Result<Vec<Order>> {
        let direction = if query.ascending {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        };

        let mut select = header_select();
        match query.order_by {
            OrderColumn::OrderId => {
                select.order_by(OrderHeaders::OrderId, direction);
            }
            OrderColumn::TotalItems => {
                select
                    .order_by(OrderHeaders::TotalItems, direction)
                    .order_by(OrderHeaders::OrderId, SortOrder::Asc);
            }
            OrderColumn::CreatedAt => {
                select
                    .order_by(OrderHeaders::CreatedAt, direction)
                    .order_by(OrderHeaders::OrderId, SortOrder::Asc);
            }
        }
        if let Some(limit) = query.limit {
            select.limit(u64::from(limit));
        }

        let (sql, values) = select.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;

        let mut orders = rows
            .iter()
            .map(header_from_row)
            .collect::<Result<Vec<_>>>()?;

        let ids: Vec<OrderId> = orders.iter().map(|o| o.order_id).collect();
        let mut lines = self.fetch_lines(&ids).await?;
        for order in &mut orders {
            order.order_lines = lines.remove(&order.order_id).unwrap_or_default();
        }

        Ok(orders)
    }
}

/// Orders staged through this handle and not yet committed or discarded.
struct SqliteOrderTransaction {
    pool: SqlitePool,
    pending: Vec<OrderId>,
}

#[async_trait]
impl OrderTransaction for SqliteOrderTransaction {
    async fn stage_order(&mut self, user_id: i64, lines: &[NewOrderLine]) -> Result<OrderId> {
        let created_at = format_timestamp(Utc::now());
        let mut tx = self.pool.begin().await?;

        let (sql, values) = Query::insert()
            .into_table(OrderHeaders::Table)
            .columns([
                OrderHeaders::UserId,
                OrderHeaders::TotalItems,
                OrderHeaders::Status,
                OrderHeaders::CreatedAt,
            ])
            .values_panic([
                user_id.into(),
                (lines.len() as i64).into(),
                STATUS_STAGED.into(),
                created_at.clone().into(),
            ])
            .build_sqlx(SqliteQueryBuilder);

        let order_id = sqlx::query_with(&sql, values)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        for (index, line) in lines.iter().enumerate() {
            let (sql, values) = Query::insert()
                .into_table(OrderLines::Table)
                .columns([
                    OrderLines::OrderId,
                    OrderLines::LineNumber,
                    OrderLines::ItemId,
                    OrderLines::Quantity,
                    OrderLines::CreatedAt,
                ])
                .values_panic([
                    order_id.into(),
                    (index as i64 + 1).into(),
                    line.item_id.into(),
                    line.quantity.into(),
                    created_at.clone().into(),
                ])
                .build_sqlx(SqliteQueryBuilder);

            sqlx::query_with(&sql, values).execute(&mut *tx).await?;
        }

        tx.commit().await?;
        self.pending.push(order_id);

        debug!(order_id, user_id, total_items = lines.len(), "order staged");
        Ok(order_id)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let mut this = self;
        if this.pending.is_empty() {
            return Ok(());
        }

        let mut tx = this.pool.begin().await?;
        let (sql, values) = Query::update()
            .table(OrderHeaders::Table)
            .value(OrderHeaders::Status, STATUS_COMMITTED)
            .and_where(Expr::col(OrderHeaders::OrderId).is_in(this.pending.iter().copied()))
            .and_where(Expr::col(OrderHeaders::Status).eq(STATUS_STAGED))
            .build_sqlx(SqliteQueryBuilder);
        let updated = sqlx::query_with(&sql, values)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        // Dropping `tx` leaves every order staged; dropping `this` discards them.
        if updated != this.pending.len() as u64 {
            return Err(StorageError::Corrupt(format!(
                "expected {} staged orders, found {}",
                this.pending.len(),
                updated
            )));
        }
        tx.commit().await?;

        this.pending.clear();
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        let mut this = self;
        let pending = std::mem::take(&mut this.pending);
        if pending.is_empty() {
            return Ok(());
        }

        if let Err(e) = discard_staged(&this.pool, &pending).await {
            this.pending = pending;
            return Err(e);
        }
        Ok(())
    }
}

impl Drop for SqliteOrderTransaction {
    fn drop(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending);
        let pool = self.pool.clone();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = discard_staged(&pool, &pending).await {
                        warn!(orders = ?pending, error = %e, "failed to discard abandoned staged orders");
                    }
                });
            }
            Err(_) => {
                warn!(orders = ?pending, "staged orders abandoned outside a runtime, purged at next startup");
            }
        }
    }
}
