//! Application configuration.
//!
//! Aggregates configuration from all modules into a single Config struct
//! that can be loaded from YAML files or environment variables. The loaded
//! value is validated once at startup and handed to each component.

mod server;

pub use server::{
    AuthConfig, ConfigError, ProjectConfig, ServerConfig, ServicesConfig, StorageConfig,
};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "ORDER_SERVICE_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "ORDER_SERVICE";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "ORDER_SERVICE_LOG";

/// Environment variable for the token signing secret.
pub const JWT_SECRET_KEY_ENV_VAR: &str = "JWT_SECRET_KEY";
/// Environment variable for the identity service base URL.
pub const AUTH_SERVICE_BASE_URL_ENV_VAR: &str = "AUTH_SERVICE_BASE_URL";
/// Environment variable for the inventory service base URL.
pub const INVENTORY_SERVICE_BASE_URL_ENV_VAR: &str = "INVENTORY_SERVICE_BASE_URL";
/// Environment variable for this service's public base URL.
pub const ORDER_SERVICE_BASE_URL_ENV_VAR: &str = "ORDER_SERVICE_BASE_URL";
/// Environment variable for the SQLite database path.
pub const DATABASE_PATH_ENV_VAR: &str = "DATABASE_PATH";
/// Environment variable for server port.
pub const PORT_ENV_VAR: &str = "PORT";
/// Environment variable for server host.
pub const HOST_ENV_VAR: &str = "HOST";
/// Environment variables for project metadata.
pub const PROJECT_NAME_ENV_VAR: &str = "PROJECT_NAME";
pub const PROJECT_VERSION_ENV_VAR: &str = "PROJECT_VERSION";
pub const PROJECT_DESCRIPTION_ENV_VAR: &str = "PROJECT_DESCRIPTION";

use serde::Deserialize;

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project metadata.
    pub project: ProjectConfig,
    /// Server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Token verification configuration.
    pub auth: AuthConfig,
    /// Downstream service endpoints.
    pub services: ServicesConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `config.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    /// 5. Conventional flat variables (`JWT_SECRET_KEY`, `PORT`, ...)
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Config = config.try_deserialize()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply the conventional flat environment variables.
    ///
    /// Takes a lookup function so tests can supply variables without
    /// touching the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup(JWT_SECRET_KEY_ENV_VAR) {
            self.auth.jwt_secret_key = secret;
        }
        if let Some(url) = lookup(AUTH_SERVICE_BASE_URL_ENV_VAR) {
            self.services.auth_base_url = url;
        }
        if let Some(url) = lookup(INVENTORY_SERVICE_BASE_URL_ENV_VAR) {
            self.services.inventory_base_url = url;
        }
        if let Some(url) = lookup(ORDER_SERVICE_BASE_URL_ENV_VAR) {
            self.server.base_url = url;
        }
        if let Some(path) = lookup(DATABASE_PATH_ENV_VAR) {
            self.storage.path = path;
        }
        if let Some(port) = lookup(PORT_ENV_VAR).and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(host) = lookup(HOST_ENV_VAR) {
            self.server.host = host;
        }
        if let Some(name) = lookup(PROJECT_NAME_ENV_VAR) {
            self.project.name = name;
        }
        if let Some(version) = lookup(PROJECT_VERSION_ENV_VAR) {
            self.project.version = version;
        }
        if let Some(description) = lookup(PROJECT_DESCRIPTION_ENV_VAR) {
            self.project.description = description;
        }
    }

    /// Reject configurations the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret_key.trim().is_empty() {
            return Err(ConfigError::Missing(JWT_SECRET_KEY_ENV_VAR));
        }
        if self.services.auth_base_url.trim().is_empty() {
            return Err(ConfigError::Missing(AUTH_SERVICE_BASE_URL_ENV_VAR));
        }
        if self.services.inventory_base_url.trim().is_empty() {
            return Err(ConfigError::Missing(INVENTORY_SERVICE_BASE_URL_ENV_VAR));
        }
        Ok(())
    }

    /// Origins allowed to call this service from a browser.
    pub fn cors_origins(&self) -> Vec<String> {
        [
            &self.services.auth_base_url,
            &self.services.inventory_base_url,
            &self.server.base_url,
        ]
        .into_iter()
        .filter(|url| !url.is_empty())
        .map(|url| url.trim_end_matches('/').to_string())
        .collect()
    }

    /// Create config for testing.
    pub fn for_test() -> Self {
        let mut config = Self::default();
        config.auth.jwt_secret_key = "test-secret".to_string();
        config.services.auth_base_url = "http://localhost:8001".to_string();
        config.services.inventory_base_url = "http://localhost:8002".to_string();
        config
    }
}
