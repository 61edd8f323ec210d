//! `DATABASE__*` settings.
//!
//! Timeouts are plain seconds; the postgres adapter turns them into pool
//! options. A zero idle timeout or lifetime disables that limit.

use serde::Deserialize;

use super::error::ValidationError;

const SCHEMES: [&str; 2] = ["postgres", "postgresql"];
const POOL_CEILING: u32 = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    /// Apply the embedded `migrations/` before serving.
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            min_connections: 5,
            max_connections: 25,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
            run_migrations: false,
        }
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("DATABASE__URL"));
        }

        match self.url.split_once("://") {
            Some((scheme, rest)) if SCHEMES.contains(&scheme) && !rest.is_empty() => {}
            _ => return Err(ValidationError::InvalidDatabaseUrl),
        }

        match (self.min_connections, self.max_connections) {
            (_, 0) => Err(ValidationError::InvalidPoolSize),
            (min, max) if min > max => Err(ValidationError::InvalidPoolSize),
            (_, max) if max > POOL_CEILING => Err(ValidationError::PoolSizeTooLarge),
            _ => Ok(()),
        }
    }
}
