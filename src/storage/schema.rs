//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.

use sea_query::Iden;

/// Order headers table schema.
#[derive(Iden)]
pub enum OrderHeaders {
    Table,
    #[iden = "order_id"]
    OrderId,
    #[iden = "user_id"]
    UserId,
    #[iden = "total_items"]
    TotalItems,
    #[iden = "status"]
    Status,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}

/// Header status while inventory is being adjusted. Never visible to reads.
pub const STATUS_STAGED: &str = "staged";
/// Header status once the order is final.
pub const STATUS_COMMITTED: &str = "committed";

/// Order lines table schema.
#[derive(Iden)]
pub enum OrderLines {
    Table,
    #[iden = "order_id"]
    OrderId,
    #[iden = "line_number"]
    LineNumber,
    #[iden = "item_id"]
    ItemId,
    #[iden = "quantity"]
    Quantity,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}

/// SQL for creating the order headers table.
///
/// AUTOINCREMENT keeps ids monotonic: the id of a discarded staged order is
/// never handed out again.
pub const CREATE_ORDER_HEADERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS order_headers (
    order_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    total_items INTEGER NOT NULL CHECK (total_items > 0),
    status TEXT NOT NULL DEFAULT 'staged' CHECK (status IN ('staged', 'committed')),
    created_at TEXT NOT NULL,
    updated_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_order_headers_created_at ON order_headers(created_at);
CREATE INDEX IF NOT EXISTS idx_order_headers_status ON order_headers(status);
"#;

/// SQL for creating the order lines table.
pub const CREATE_ORDER_LINES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS order_lines (
    order_id INTEGER NOT NULL REFERENCES order_headers(order_id),
    line_number INTEGER NOT NULL CHECK (line_number > 0),
    item_id INTEGER NOT NULL,
    quantity INTEGER NOT NULL CHECK (quantity > 0),
    created_at TEXT NOT NULL,
    updated_at TEXT,
    PRIMARY KEY (order_id, line_number)
);
"#;

/// SQL removing staged orders left behind by a previous process.
pub const PURGE_STAGED_ORDERS: &str = r#"
DELETE FROM order_lines
WHERE order_id IN (SELECT order_id FROM order_headers WHERE status = 'staged');

DELETE FROM order_headers WHERE status = 'staged';
"#;
