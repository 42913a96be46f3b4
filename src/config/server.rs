//! Server, storage, and downstream service configuration types.

use serde::Deserialize;

/// Project metadata surfaced on the index route.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub version: String,
    pub description: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "ORDER-SERVICE".to_string(),
            version: "1.0.0".to_string(),
            description: "ORDER-SERVICE MICROSERVICE API".to_string(),
        }
    }
}

impl ProjectConfig {
    /// Message served on the index route.
    pub fn banner(&self) -> String {
        format!("{} MICROSERVICE API", self.name)
    }
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port for the HTTP API.
    pub port: u16,
    /// Externally reachable base URL of this service (CORS allow-list).
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8003,
            base_url: "http://localhost:8003".to_string(),
        }
    }
}

impl ServerConfig {
    /// Socket address string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    pub path: String,
    /// Maximum pooled connections.
    pub max_connections: u32,
    /// How long a writer waits for SQLite's database lock before failing.
    pub busy_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "./data/orders.db".to_string(),
            max_connections: 5,
            busy_timeout_secs: 30,
        }
    }
}

/// Bearer token verification settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared HMAC secret used by the identity service to sign tokens.
    pub jwt_secret_key: String,
}

/// Base URLs of the collaborating services.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// Identity service (token issuance).
    pub auth_base_url: String,
    /// Inventory service (stock adjustment).
    pub inventory_base_url: String,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing {0} configuration")]
    Missing(&'static str),

    #[error("Failed to load config: {0}")]
    Load(#[from] ::config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let server = ServerConfig::default();
        assert_eq!(server.port, 8003);
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.bind_addr(), "0.0.0.0:8003");
    }

    #[test]
    fn test_project_config_default() {
        let project = ProjectConfig::default();
        assert_eq!(project.name, "ORDER-SERVICE");
        assert_eq!(project.description, "ORDER-SERVICE MICROSERVICE API");
    }

    #[test]
    fn test_banner_follows_project_name() {
        let project = ProjectConfig {
            name: "BILLING".to_string(),
            description: "something else".to_string(),
            ..Default::default()
        };
        assert_eq!(project.banner(), "BILLING MICROSERVICE API");
        assert_eq!(ProjectConfig::default().banner(), "ORDER-SERVICE MICROSERVICE API");
    }
}
