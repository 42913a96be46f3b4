//! Order routes.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use tracing::debug;

use crate::auth::AuthContext;
use crate::model::{ListOrders, Order, OrderColumn, OrderId};
use crate::services::{CreateOrderRequest, CreatedOrder, OrderError};

use super::error::ApiError;
use super::AppState;

/// Query string of `GET /orders/`.
#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersParams {
    pub limit: Option<u32>,
    pub order_by: Option<String>,
    pub ascending: Option<bool>,
}

impl From<ListOrdersParams> for ListOrders {
    fn from(params: ListOrdersParams) -> Self {
        Self {
            limit: params.limit,
            order_by: OrderColumn::parse_or_default(params.order_by.as_deref()),
            ascending: params.ascending.unwrap_or(true),
        }
    }
}

pub(super) async fn create_order(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedOrder>), ApiError> {
    let Json(request) = body.map_err(|e| ApiError::invalid_request(e.body_text()))?;
    debug!(caller = context.claims.user_id, "create order requested");

    let created = state
        .orders
        .create_order(&request, &context.authorization)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn list_orders(
    State(state): State<AppState>,
    params: Result<Query<ListOrdersParams>, QueryRejection>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::invalid_request(e.body_text()))?;
    let query = ListOrders::from(params);

    let orders = state
        .store
        .fetch_all(query)
        .await
        .map_err(OrderError::from)?;
    Ok(Json(orders))
}

pub(super) async fn get_order(
    State(state): State<AppState>,
    order_id: Result<Path<OrderId>, PathRejection>,
) -> Result<Json<Order>, ApiError> {
    let Path(order_id) = order_id.map_err(|e| ApiError::invalid_request(e.body_text()))?;
    if order_id <= 0 {
        return Err(ApiError::invalid_request("order_id must be greater than 0"));
    }

    let order = state
        .store
        .fetch_by_id(order_id)
        .await
        .map_err(OrderError::from)?;
    Ok(Json(order))
}
