//! Authentication configuration (Clerk session tokens)

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Session token verification settings.
///
/// Key material comes from exactly one of `jwks_url` (remote key set, cached)
/// or `jwt_key` (PEM-encoded RSA public key, no network).
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// JWKS endpoint, e.g. `https://api.clerk.com/v1/jwks`
    #[serde(default)]
    pub jwks_url: Option<String>,

    /// Clerk secret key, sent as a bearer credential when fetching JWKS
    #[serde(default)]
    pub secret_key: Option<SecretString>,

    /// PEM-encoded public key for networkless verification
    #[serde(default)]
    pub jwt_key: Option<String>,

    /// Expected `iss` claim, checked when set
    #[serde(default)]
    pub issuer: Option<String>,

    /// Accepted `azp` values (comma-separated). Empty accepts any.
    #[serde(default)]
    pub authorized_parties: Option<String>,

    /// JWKS cache TTL in seconds
    #[serde(default = "default_jwks_cache_ttl")]
    pub jwks_cache_ttl_secs: u64,
}

impl AuthConfig {
    pub fn jwks_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.jwks_cache_ttl_secs)
    }

    pub fn authorized_parties_list(&self) -> Vec<String> {
        self.authorized_parties
            .as_ref()
            .map(|s| {
                s.split(',')
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Validate authentication configuration
    ///
    /// In production, requires HTTPS for the JWKS URL.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let jwks_url = self.jwks_url.as_deref().filter(|u| !u.is_empty());
        let jwt_key = self.jwt_key.as_deref().filter(|k| !k.is_empty());

        match (jwks_url, jwt_key) {
            (None, None) => Err(ValidationError::MissingRequired("AUTH__JWKS_URL")),
            (Some(_), Some(_)) => Err(ValidationError::AmbiguousKeyMaterial),
            (Some(url), None) => {
                if *environment == Environment::Production && !url.starts_with("https://") {
                    return Err(ValidationError::JwksUrlMustBeHttps);
                }
                Ok(())
            }
            (None, Some(_)) => Ok(()),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwks_url: None,
            secret_key: None,
            jwt_key: None,
            issuer: None,
            authorized_parties: None,
            jwks_cache_ttl_secs: default_jwks_cache_ttl(),
        }
    }
}

fn default_jwks_cache_ttl() -> u64 {
    3600
}
