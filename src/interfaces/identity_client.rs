//! Identity service client interface.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Credentials posted to the login passthrough.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Token response returned verbatim by the identity service.
pub type LoginResponse = Value;

/// Errors from the identity service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("Authentication failed: {detail}")]
    Rejected { status: u16, detail: String },

    #[error("identity service unreachable: {0}")]
    Transport(String),
}

/// Interface for exchanging credentials for a bearer token.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    async fn request_token(&self, form: &LoginForm) -> Result<LoginResponse, IdentityError>;
}
