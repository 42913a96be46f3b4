//! Index and login passthrough routes.

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::{Form, Json};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::interfaces::{IdentityError, LoginForm, LoginResponse};

use super::error::ApiError;
use super::AppState;

pub(super) async fn index(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "message": &*state.index_message }))
}

/// Exchange credentials for a token at the identity service.
pub(super) async fn login(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Form(form) = form.map_err(|e| ApiError::invalid_request(e.body_text()))?;

    let body = state
        .identity
        .request_token(&form)
        .await
        .map_err(|e| match e {
            IdentityError::Transport(cause) => {
                error!(username = %form.username, error = %cause, "login passthrough failed");
                ApiError::login_failed(&form.username)
            }
            rejected => ApiError::from(rejected),
        })?;
    info!(username = %form.username, "login forwarded");
    Ok(Json(body))
}
