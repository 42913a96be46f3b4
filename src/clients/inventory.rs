//! HTTP adapter for the inventory service.
//!
//! Issues `PATCH {base}/items/{item_id}?change_quantity={quantity}` with the
//! caller's `Authorization` header. One request per call; no retries.

use async_trait::async_trait;
use http::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::interfaces::{InventoryClient, InventoryError};

/// Inventory service client over HTTP.
#[derive(Clone)]
pub struct HttpInventoryClient {
    client: Client,
    base_url: String,
}

impl HttpInventoryClient {
    /// Create a client for the inventory service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client reusing an existing connection pool.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn item_url(&self, item_id: i64) -> String {
        format!("{}/items/{}", self.base_url, item_id)
    }
}

/// Pull a human-readable reason out of an error body.
///
/// Prefers a JSON `detail` field, falls back to the raw text.
fn failure_detail(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").map(|d| match d {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[async_trait]
impl InventoryClient for HttpInventoryClient {
    async fn decrement_stock(
        &self,
        item_id: i64,
        quantity: i64,
        authorization: &str,
    ) -> Result<(), InventoryError> {
        let url = self.item_url(item_id);
        debug!(url = %url, item_id, quantity, "adjusting inventory");

        let response = self
            .client
            .patch(&url)
            .query(&[("change_quantity", quantity)])
            .header(AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| {
                warn!(item_id, error = %e, "inventory service unreachable");
                InventoryError::AdjustmentFailed {
                    item_id,
                    cause: format!("inventory service unreachable: {}", e),
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let detail = failure_detail(&body);
        warn!(item_id, quantity, status = %status, detail = %detail, "inventory adjustment rejected");

        Err(InventoryError::AdjustmentFailed {
            item_id,
            cause: if detail.is_empty() {
                format!("inventory service returned {}", status)
            } else {
                format!("inventory service returned {}: {}", status, detail)
            },
        })
    }
}
