//! HTTP adapter for the identity service's token endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{error, warn};

use crate::interfaces::{IdentityClient, IdentityError, LoginForm, LoginResponse};

/// Identity service client over HTTP.
#[derive(Clone)]
pub struct HttpIdentityClient {
    client: Client,
    base_url: String,
}

impl HttpIdentityClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn token_url(&self) -> String {
        format!("{}/auth/token", self.base_url)
    }
}

#[async_trait]
impl IdentityClient for HttpIdentityClient {
    async fn request_token(&self, form: &LoginForm) -> Result<LoginResponse, IdentityError> {
        let remember_me = if form.remember_me { "true" } else { "false" };
        let params = [
            ("username", form.username.as_str()),
            ("password", form.password.as_str()),
            ("remember_me", remember_me),
        ];

        let response = self
            .client
            .post(self.token_url())
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                error!(username = %form.username, error = %e, "identity service unreachable");
                IdentityError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body: Option<Value> = response.json().await.ok();

        if status == reqwest::StatusCode::OK {
            return body.ok_or_else(|| {
                IdentityError::Transport("identity service returned a non-JSON body".to_string())
            });
        }

        let detail = body
            .as_ref()
            .and_then(|b| b.get("detail"))
            .and_then(Value::as_str)
            .unwrap_or("Unknown error")
            .to_string();
        warn!(username = %form.username, status = %status, detail = %detail, "login rejected");

        Err(IdentityError::Rejected {
            status: status.as_u16(),
            detail,
        })
    }
}
