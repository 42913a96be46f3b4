//! HTTP API for the order service.
//!
//! Endpoints (trailing slash optional on the collection):
//! - `GET /` - service banner
//! - `POST /auth/token` - login passthrough to the identity service
//! - `POST /orders/` - create an order (`manage_orders`)
//! - `GET /orders/` - list orders (`manage_orders` or `view_orders`)
//! - `GET /orders/:order_id` - fetch one order (`manage_orders` or `view_orders`)

mod error;
mod login;
mod middleware;
mod orders;

use std::future::Future;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post, MethodRouter};
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::auth::{Guard, TokenValidator, MANAGE_ORDERS, VIEW_ORDERS};
use crate::interfaces::{IdentityClient, InventoryClient, OrderStore};
use crate::services::OrderCreationService;

pub use error::{ApiError, INTERNAL_ERROR_DETAIL};
pub use middleware::require_capability;
pub use orders::ListOrdersParams;

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    orders: Arc<OrderCreationService>,
    store: Arc<dyn OrderStore>,
    identity: Arc<dyn IdentityClient>,
    index_message: Arc<str>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn OrderStore>,
        inventory: Arc<dyn InventoryClient>,
        identity: Arc<dyn IdentityClient>,
        index_message: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            orders: Arc::new(OrderCreationService::new(Arc::clone(&store), inventory)),
            store,
            identity,
            index_message: index_message.into(),
        }
    }
}

/// Build the axum router (separated for testing).
pub fn router(state: AppState, validator: Arc<TokenValidator>, cors_origins: &[String]) -> Router {
    let manage = Guard::require_permissions(Arc::clone(&validator), &[MANAGE_ORDERS]);
    let view = Guard::require_permissions(validator, &[MANAGE_ORDERS, VIEW_ORDERS]);

    let collection: MethodRouter<AppState> = get(orders::list_orders)
        .route_layer(axum::middleware::from_fn_with_state(
            view.clone(),
            require_capability,
        ))
        .merge(post(orders::create_order).route_layer(
            axum::middleware::from_fn_with_state(manage, require_capability),
        ));

    let item: MethodRouter<AppState> = get(orders::get_order).route_layer(
        axum::middleware::from_fn_with_state(view, require_capability),
    );

    Router::new()
        .route("/", get(login::index))
        .route("/auth/token", post(login::login))
        .route("/orders", collection.clone())
        .route("/orders/", collection)
        .route("/orders/:order_id", item)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the collaborating services' browser origins.
///
/// Credentials are allowed, so methods and headers are mirrored from the
/// preflight instead of using wildcards.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Serve `app` on `addr` until `shutdown` resolves.
pub async fn serve<F>(app: Router, addr: &str, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    info!(addr = %local, "order service listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
