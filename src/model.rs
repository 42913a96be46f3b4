//! Order aggregate types shared by storage, services, and the HTTP layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned order identity.
pub type OrderId = i64;

/// A line as requested by the caller, before it has a line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderLine {
    pub item_id: i64,
    pub quantity: i64,
}

/// A persisted order line. `(order_id, line_number)` is its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub order_id: OrderId,
    /// 1-based, in input order, contiguous within the order.
    pub line_number: i64,
    pub item_id: i64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A committed order header with all of its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: i64,
    /// Always equals `order_lines.len()`.
    pub total_items: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub order_lines: Vec<OrderLine>,
}

/// Columns listings may be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderColumn {
    #[default]
    OrderId,
    TotalItems,
    CreatedAt,
}

impl OrderColumn {
    /// Resolve a caller-supplied column name.
    ///
    /// Matching is case-insensitive. Anything outside the allow-list,
    /// including an absent value, resolves to `OrderId`; this is part of
    /// the listing contract, not an error.
    pub fn parse_or_default(name: Option<&str>) -> Self {
        match name.map(str::to_ascii_lowercase).as_deref() {
            Some("total_items") => Self::TotalItems,
            Some("created_at") => Self::CreatedAt,
            _ => Self::OrderId,
        }
    }
}

/// Parameters for listing committed orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOrders {
    pub limit: Option<u32>,
    pub order_by: OrderColumn,
    pub ascending: bool,
}

impl Default for ListOrders {
    fn default() -> Self {
        Self {
            limit: None,
            order_by: OrderColumn::OrderId,
            ascending: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_column_allow_list() {
        assert_eq!(OrderColumn::parse_or_default(Some("order_id")), OrderColumn::OrderId);
        assert_eq!(
            OrderColumn::parse_or_default(Some("TOTAL_ITEMS")),
            OrderColumn::TotalItems
        );
        assert_eq!(
            OrderColumn::parse_or_default(Some("created_at")),
            OrderColumn::CreatedAt
        );
    }

    #[test]
    fn test_order_column_fallback() {
        assert_eq!(OrderColumn::parse_or_default(None), OrderColumn::OrderId);
        assert_eq!(OrderColumn::parse_or_default(Some("user_id")), OrderColumn::OrderId);
        assert_eq!(
            OrderColumn::parse_or_default(Some("order_id; DROP TABLE")),
            OrderColumn::OrderId
        );
    }
}
