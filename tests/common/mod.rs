//! Shared utilities for integration tests.
//!
//! Provides an in-process inventory service and token minting.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::patch;
use axum::{Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// Secret shared by the minted tokens and the service under test.
pub const TEST_SECRET: &str = "integration-secret";

/// Build an `Authorization` header value for a caller with `permissions`.
pub fn bearer(permissions: &[&str]) -> String {
    bearer_expiring_in(permissions, Duration::minutes(15))
}

pub fn bearer_expiring_in(permissions: &[&str], ttl: Duration) -> String {
    let claims = json!({
        "username": "integration",
        "user_id": 1,
        "roles": ["staff"],
        "permissions": permissions,
        "exp": (Utc::now() + ttl).timestamp(),
    });
    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("failed to sign token");
    format!("Bearer {}", token)
}

#[derive(Debug, Deserialize)]
struct ChangeQuantity {
    change_quantity: i64,
}

/// One adjustment received by the fake inventory service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjustment {
    pub item_id: i64,
    pub quantity: i64,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct InventoryState {
    stock: HashMap<i64, i64>,
    adjustments: Vec<Adjustment>,
}

/// Fake inventory service holding per-item stock levels.
#[derive(Clone)]
pub struct FakeInventory {
    pub base_url: String,
    state: Arc<Mutex<InventoryState>>,
}

impl FakeInventory {
    /// Start the service on an ephemeral port with the given stock.
    pub async fn start(stock: &[(i64, i64)]) -> Self {
        let state = Arc::new(Mutex::new(InventoryState {
            stock: stock.iter().copied().collect(),
            adjustments: Vec::new(),
        }));

        let app = Router::new()
            .route("/items/:item_id", patch(adjust))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind fake inventory");
        let addr = listener.local_addr().expect("no local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake inventory died");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub async fn stock_of(&self, item_id: i64) -> Option<i64> {
        self.state.lock().await.stock.get(&item_id).copied()
    }

    pub async fn adjustments(&self) -> Vec<Adjustment> {
        self.state.lock().await.adjustments.clone()
    }
}

async fn adjust(
    State(state): State<Arc<Mutex<InventoryState>>>,
    Path(item_id): Path<i64>,
    Query(q): Query<ChangeQuantity>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut state = state.lock().await;
    state.adjustments.push(Adjustment {
        item_id,
        quantity: q.change_quantity,
        authorization: authorization.clone(),
    });

    if authorization.is_none() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "not authenticated"})),
        );
    }

    match state.stock.get_mut(&item_id) {
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": format!("item {} not found", item_id)})),
        ),
        Some(level) if *level < q.change_quantity => (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "not enough stock"})),
        ),
        Some(level) => {
            *level -= q.change_quantity;
            (
                StatusCode::OK,
                Json(json!({"item_id": item_id, "quantity": *level})),
            )
        }
    }
}
