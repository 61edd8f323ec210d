//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `IDENTITY_SYNC` prefix
//! and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use identity_sync::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod database;
mod error;
mod server;
mod webhook;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};
pub use webhook::WebhookConfig;

use serde::Deserialize;

const ENV_PREFIX: &str = "IDENTITY_SYNC";

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, CORS)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection pool)
    pub database: DatabaseConfig,

    /// Session token verification (JWKS or PEM key)
    #[serde(default)]
    pub auth: AuthConfig,

    /// Inbound webhook signing
    pub webhook: WebhookConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` if present, except in production
    /// 2. Reads variables with the `IDENTITY_SYNC` prefix
    /// 3. Uses `__` to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `IDENTITY_SYNC__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `IDENTITY_SYNC__WEBHOOK__SIGNING_SECRET=whsec_...` -> `webhook.signing_secret`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or unparseable.
    pub fn load() -> Result<Self, ConfigError> {
        let production = std::env::var(format!("{}__SERVER__ENVIRONMENT", ENV_PREFIX))
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);
        if !production {
            dotenvy::dotenv().ok();
        }

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found, section by section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.webhook.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
