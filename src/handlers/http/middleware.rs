//! Per-route authorization middleware.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::auth::Guard;

use super::error::ApiError;

/// Reject the request unless the guard accepts its `Authorization` header.
///
/// On success the [`AuthContext`](crate::auth::AuthContext) is stored in the
/// request extensions. Runs before any body extractor, so an unauthenticated
/// request never reaches body parsing.
pub async fn require_capability(
    State(guard): State<Guard>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match guard.authorize(header) {
        Ok(context) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}
