//! Mock client implementations for testing.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::interfaces::{
    IdentityClient, IdentityError, InventoryClient, InventoryError, LoginForm, LoginResponse,
};

/// One recorded `decrement_stock` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockCall {
    pub item_id: i64,
    pub quantity: i64,
    pub authorization: String,
}

/// Mock inventory client that records calls and rejects configured items.
#[derive(Clone, Default)]
pub struct MockInventoryClient {
    calls: Arc<Mutex<Vec<StockCall>>>,
    failing_items: Arc<Mutex<HashSet<i64>>>,
}

impl MockInventoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every adjustment for `item_id`.
    pub async fn fail_item(&self, item_id: i64) {
        self.failing_items.lock().await.insert(item_id);
    }

    pub async fn calls(&self) -> Vec<StockCall> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl InventoryClient for MockInventoryClient {
    async fn decrement_stock(
        &self,
        item_id: i64,
        quantity: i64,
        authorization: &str,
    ) -> Result<(), InventoryError> {
        self.calls.lock().await.push(StockCall {
            item_id,
            quantity,
            authorization: authorization.to_string(),
        });

        if self.failing_items.lock().await.contains(&item_id) {
            return Err(InventoryError::AdjustmentFailed {
                item_id,
                cause: "insufficient stock".to_string(),
            });
        }
        Ok(())
    }
}

/// Mock identity client with a fixed credential table.
#[derive(Clone, Default)]
pub struct MockIdentityClient {
    responses: Arc<HashMap<(String, String), LoginResponse>>,
    transport_failure: Option<String>,
}

impl MockIdentityClient {
    /// Accept exactly the given `(username, password) -> response` pairs.
    pub fn with_responses(responses: HashMap<(String, String), LoginResponse>) -> Self {
        Self {
            responses: Arc::new(responses),
            transport_failure: None,
        }
    }

    /// Fail every request as if the service were down, with `cause`.
    pub fn unreachable(cause: impl Into<String>) -> Self {
        Self {
            responses: Arc::default(),
            transport_failure: Some(cause.into()),
        }
    }
}

#[async_trait]
impl IdentityClient for MockIdentityClient {
    async fn request_token(&self, form: &LoginForm) -> Result<LoginResponse, IdentityError> {
        if let Some(cause) = &self.transport_failure {
            return Err(IdentityError::Transport(cause.clone()));
        }
        self.responses
            .get(&(form.username.clone(), form.password.clone()))
            .cloned()
            .ok_or_else(|| IdentityError::Rejected {
                status: 401,
                detail: "Incorrect username or password".to_string(),
            })
    }
}
