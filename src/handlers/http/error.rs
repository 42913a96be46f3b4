//! Mapping of domain errors onto HTTP responses.
//!
//! Every error body has the shape `{"detail": "..."}`.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::auth::AuthError;
use crate::interfaces::IdentityError;
use crate::services::OrderError;

/// Detail returned for server-side faults; internals are only logged.
pub const INTERNAL_ERROR_DETAIL: &str = "an error occurred while processing the order";

/// Detail returned when the identity service cannot be reached.
pub const LOGIN_ERROR_DETAIL: &str = "An error occurred while authenticating the user";

/// An error ready to be rendered as an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn invalid_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    /// Login passthrough failed for a reason other than a rejection.
    pub fn login_failed(username: &str) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{} with username {}", LOGIN_ERROR_DETAIL, username),
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let status = match err {
            AuthError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
        };
        Self::new(status, err.to_string())
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::InvalidRequest(_)
            | OrderError::InventoryAdjustmentFailed { .. }
            | OrderError::IntegrityViolation(_) => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            OrderError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            OrderError::PersistenceFailure(_) | OrderError::InternalInconsistency(_) => {
                error!(error = %err, "order request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_DETAIL)
            }
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Rejected { status, .. } => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                Self::new(status, err.to_string())
            }
            IdentityError::Transport(_) => {
                error!(error = %err, "login passthrough failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, LOGIN_ERROR_DETAIL)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(json!({ "detail": self.detail }))).into_response();
        if self.status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
