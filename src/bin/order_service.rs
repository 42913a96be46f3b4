//! order-service: order management HTTP API
//!
//! Creates orders against a local SQLite database and decrements stock in
//! the inventory service. Bearer tokens issued by the identity service are
//! verified locally with the shared HS256 secret.
//!
//! ## Architecture
//! ```text
//! [client] -> [order-service :8003] -> [SQLite]
//!                  |          |
//!                  v          v
//!        [identity :8001]  [inventory :8002]
//! ```
//!
//! ## Configuration
//! - JWT_SECRET_KEY: token signing secret (required)
//! - AUTH_SERVICE_BASE_URL: identity service base URL (required)
//! - INVENTORY_SERVICE_BASE_URL: inventory service base URL (required)
//! - ORDER_SERVICE_BASE_URL: this service's public URL (CORS)
//! - DATABASE_PATH: SQLite file (default: ./data/orders.db)
//! - HOST / PORT: listener address (default: 0.0.0.0:8003)
//! - ORDER_SERVICE_LOG: tracing filter (default: info)

use std::sync::Arc;

use tracing::{error, info};

use order_service::auth::TokenValidator;
use order_service::clients::{HttpIdentityClient, HttpInventoryClient};
use order_service::config::Config;
use order_service::handlers::http::{router, serve, AppState};
use order_service::storage::init_storage;
use order_service::utils::bootstrap::{init_tracing, parse_config_path, shutdown_signal};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config_path = parse_config_path();
    let config = Config::load(config_path.as_deref()).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;
    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    info!(
        name = %config.project.name,
        version = %config.project.version,
        description = %config.project.description,
        "starting order-service"
    );

    let store = init_storage(&config.storage).await?;

    // One connection pool shared by both downstream clients.
    let http = reqwest::Client::new();
    let inventory = Arc::new(HttpInventoryClient::with_client(
        http.clone(),
        &config.services.inventory_base_url,
    ));
    let identity = Arc::new(HttpIdentityClient::with_client(
        http,
        &config.services.auth_base_url,
    ));
    info!(
        inventory = %config.services.inventory_base_url,
        identity = %config.services.auth_base_url,
        "downstream services configured"
    );

    let validator = Arc::new(TokenValidator::new(&config.auth.jwt_secret_key));
    let state = AppState::new(store, inventory, identity, config.project.banner());
    let app = router(state, validator, &config.cors_origins());

    serve(app, &config.server.bind_addr(), shutdown_signal()).await?;

    info!("order-service stopped");
    Ok(())
}
