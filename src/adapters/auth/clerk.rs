//! Clerk adapter for session token verification.
//!
//! Implements the `SessionValidator` port for Clerk session JWTs:
//!
//! 1. Resolve the verification key, either from the Clerk JWKS endpoint
//!    (cached; an unknown `kid` refetches at most every 30s) or from a
//!    statically configured PEM key
//! 2. Verify signature, `exp` and `nbf` with a small leeway, and `iss` when
//!    configured
//! 3. Check `azp` against the authorized parties when both are present
//! 4. Map `sub` and the active organization (`org_id`, or `o.id` in v2
//!    tokens) to an `AuthenticatedSubject`
//!
//! Every failure is reported as `AuthError::InvalidToken`; the cause is only
//! logged.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{
    decode, decode_header, jwk::JwkSet, jwk::KeyAlgorithm, Algorithm, DecodingKey, Header,
    Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::AuthConfig;
use crate::domain::foundation::{AuthError, AuthenticatedSubject, ExternalOrgId, ExternalUserId};
use crate::ports::SessionValidator;

/// Clock skew tolerated on `exp` and `nbf`.
const LEEWAY_SECS: u64 = 5;

const DEFAULT_JWKS_CACHE: Duration = Duration::from_secs(3600);

/// Minimum age of a fresh key set before an unknown `kid` may trigger a refetch.
const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for the Clerk session validator.
#[derive(Debug, Clone, Default)]
pub struct ClerkConfig {
    pub jwks_url: Option<String>,
    pub secret_key: Option<SecretString>,
    /// PEM-encoded RSA public key
    pub jwt_key: Option<String>,
    pub issuer: Option<String>,
    pub authorized_parties: Vec<String>,
    pub jwks_cache_duration: Option<Duration>,
}

impl ClerkConfig {
    /// Verify against a remote key set.
    pub fn jwks(url: impl Into<String>) -> Self {
        Self {
            jwks_url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Verify against a static PEM public key.
    pub fn pem(key: impl Into<String>) -> Self {
        Self {
            jwt_key: Some(key.into()),
            ..Default::default()
        }
    }

    pub fn with_secret_key(mut self, secret_key: SecretString) -> Self {
        self.secret_key = Some(secret_key);
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_authorized_parties(mut self, parties: Vec<String>) -> Self {
        self.authorized_parties = parties;
        self
    }

    pub fn with_cache_duration(mut self, duration: Duration) -> Self {
        self.jwks_cache_duration = Some(duration);
        self
    }
}

impl From<&AuthConfig> for ClerkConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            jwks_url: config.jwks_url.clone().filter(|u| !u.is_empty()),
            secret_key: config.secret_key.clone(),
            jwt_key: config.jwt_key.clone().filter(|k| !k.is_empty()),
            issuer: config.issuer.clone().filter(|i| !i.is_empty()),
            authorized_parties: config.authorized_parties_list(),
            jwks_cache_duration: Some(config.jwks_cache_ttl()),
        }
    }
}

/// Errors building the validator. Only raised at startup.
#[derive(Debug, Error)]
pub enum ClerkSetupError {
    #[error("No key material configured (set a JWKS URL or a PEM key)")]
    MissingKeyMaterial,

    #[error("Invalid PEM public key: {0}")]
    InvalidPem(String),

    #[error("Failed to create HTTP client: {0}")]
    HttpClient(String),
}

/// Session token claims used by this service.
#[derive(Debug, Deserialize)]
struct ClerkClaims {
    sub: String,

    /// Authorized party: the origin that requested the token
    #[serde(default)]
    azp: Option<String>,

    /// Active organization (v1 session tokens)
    #[serde(default)]
    org_id: Option<String>,

    /// Compact organization claim (v2 session tokens)
    #[serde(default)]
    o: Option<OrganizationClaim>,
}

#[derive(Debug, Deserialize)]
struct OrganizationClaim {
    #[serde(default)]
    id: Option<String>,
}

impl ClerkClaims {
    fn active_org(&self) -> Option<&str> {
        self.org_id
            .as_deref()
            .or_else(|| self.o.as_ref().and_then(|o| o.id.as_deref()))
            .filter(|id| !id.is_empty())
    }
}

/// Cached JWKS with expiry tracking.
struct JwksCache {
    jwks: JwkSet,
    fetched_at: Instant,
    cache_duration: Duration,
}

impl JwksCache {
    fn new(jwks: JwkSet, cache_duration: Duration) -> Self {
        Self {
            jwks,
            fetched_at: Instant::now(),
            cache_duration,
        }
    }

    fn is_expired(&self) -> bool {
        self.fetched_at.elapsed() > self.cache_duration
    }

    fn lookup(&self, kid: &str) -> Result<CacheLookup, AuthError> {
        if self.is_expired() {
            return Ok(CacheLookup::Refetch);
        }
        match key_from_set(&self.jwks, kid)? {
            Some(found) => Ok(CacheLookup::Hit(found)),
            None if self.fetched_at.elapsed() < MIN_REFETCH_INTERVAL => Ok(CacheLookup::Reject),
            // Keys may have rotated
            None => Ok(CacheLookup::Refetch),
        }
    }
}

enum CacheLookup {
    Hit((DecodingKey, Algorithm)),
    Refetch,
    Reject,
}

enum KeyMaterial {
    Remote {
        url: String,
        secret_key: Option<SecretString>,
        http_client: reqwest::Client,
        cache: Arc<RwLock<Option<JwksCache>>>,
        cache_duration: Duration,
    },
    Static {
        key: DecodingKey,
        algorithm: Algorithm,
    },
}

/// Clerk session validator.
pub struct ClerkSessionValidator {
    keys: KeyMaterial,
    issuer: Option<String>,
    authorized_parties: Vec<String>,
}

impl ClerkSessionValidator {
    /// Builds a validator. Remote keys are fetched lazily on first use.
    pub fn new(config: ClerkConfig) -> Result<Self, ClerkSetupError> {
        let keys = match (config.jwks_url, config.jwt_key) {
            (_, Some(pem)) => KeyMaterial::Static {
                key: DecodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|e| ClerkSetupError::InvalidPem(e.to_string()))?,
                algorithm: Algorithm::RS256,
            },
            (Some(url), None) => {
                let http_client = reqwest::Client::builder()
                    .timeout(Duration::from_secs(10))
                    .build()
                    .map_err(|e| ClerkSetupError::HttpClient(e.to_string()))?;
                KeyMaterial::Remote {
                    url,
                    secret_key: config.secret_key,
                    http_client,
                    cache: Arc::new(RwLock::new(None)),
                    cache_duration: config.jwks_cache_duration.unwrap_or(DEFAULT_JWKS_CACHE),
                }
            }
            (None, None) => return Err(ClerkSetupError::MissingKeyMaterial),
        };

        Ok(Self {
            keys,
            issuer: config.issuer,
            authorized_parties: config.authorized_parties,
        })
    }

    /// Builds a validator around an already-decoded key.
    pub fn with_static_key(key: DecodingKey, algorithm: Algorithm) -> Self {
        Self {
            keys: KeyMaterial::Static { key, algorithm },
            issuer: None,
            authorized_parties: Vec::new(),
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_authorized_parties(mut self, parties: Vec<String>) -> Self {
        self.authorized_parties = parties;
        self
    }

    async fn fetch_jwks(
        url: &str,
        secret_key: Option<&SecretString>,
        http_client: &reqwest::Client,
    ) -> Result<JwkSet, AuthError> {
        tracing::debug!("Fetching JWKS from {}", url);

        let mut request = http_client.get(url);
        if let Some(secret) = secret_key {
            request = request.bearer_auth(secret.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("Failed to fetch JWKS: {}", e);
            AuthError::InvalidToken
        })?;

        if !response.status().is_success() {
            tracing::error!("JWKS endpoint returned {}", response.status());
            return Err(AuthError::InvalidToken);
        }

        let jwks: JwkSet = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse JWKS: {}", e);
            AuthError::InvalidToken
        })?;

        tracing::debug!("Fetched {} keys from JWKS", jwks.keys.len());
        Ok(jwks)
    }

    /// Resolves the key and algorithm for a token header.
    async fn resolve_key(&self, header: &Header) -> Result<(DecodingKey, Algorithm), AuthError> {
        match &self.keys {
            KeyMaterial::Static { key, algorithm } => Ok((key.clone(), *algorithm)),
            KeyMaterial::Remote {
                url,
                secret_key,
                http_client,
                cache,
                cache_duration,
            } => {
                let kid = header.kid.as_ref().ok_or_else(|| {
                    tracing::warn!("JWT missing 'kid' header");
                    AuthError::InvalidToken
                })?;

                if let Some(cached) = cache.read().await.as_ref() {
                    match cached.lookup(kid)? {
                        CacheLookup::Hit(found) => return Ok(found),
                        CacheLookup::Reject => {
                            tracing::warn!("Unknown kid {} within refetch interval", kid);
                            return Err(AuthError::InvalidToken);
                        }
                        CacheLookup::Refetch => {}
                    }
                }

                let jwks = Self::fetch_jwks(url, secret_key.as_ref(), http_client).await?;
                let found = key_from_set(&jwks, kid)?;
                *cache.write().await = Some(JwksCache::new(jwks, *cache_duration));

                found.ok_or_else(|| {
                    tracing::warn!("No matching key found for kid: {}", kid);
                    AuthError::InvalidToken
                })
            }
        }
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.leeway = LEEWAY_SECS;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        // Session tokens carry no audience
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation
    }

    fn check_authorized_party(&self, azp: Option<&str>) -> Result<(), AuthError> {
        match azp {
            Some(azp) if !self.authorized_parties.is_empty() => {
                if self.authorized_parties.iter().any(|p| p == azp) {
                    Ok(())
                } else {
                    tracing::warn!("Unauthorized party in token: {}", azp);
                    Err(AuthError::InvalidToken)
                }
            }
            _ => Ok(()),
        }
    }
}

/// Looks up `kid` in a key set and builds its decoding key.
fn key_from_set(jwks: &JwkSet, kid: &str) -> Result<Option<(DecodingKey, Algorithm)>, AuthError> {
    let Some(jwk) = jwks.find(kid) else {
        return Ok(None);
    };

    let algorithm = match jwk.common.key_algorithm {
        Some(KeyAlgorithm::RS256) | None => Algorithm::RS256,
        Some(KeyAlgorithm::RS384) => Algorithm::RS384,
        Some(KeyAlgorithm::RS512) => Algorithm::RS512,
        Some(KeyAlgorithm::ES256) => Algorithm::ES256,
        Some(KeyAlgorithm::ES384) => Algorithm::ES384,
        Some(other) => {
            tracing::warn!("Unsupported algorithm: {:?}", other);
            return Err(AuthError::InvalidToken);
        }
    };

    let key = DecodingKey::from_jwk(jwk).map_err(|e| {
        tracing::warn!("Failed to create decoding key: {}", e);
        AuthError::InvalidToken
    })?;

    Ok(Some((key, algorithm)))
}

#[async_trait]
impl SessionValidator for ClerkSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedSubject, AuthError> {
        let header = decode_header(token).map_err(|e| {
            tracing::debug!("Failed to decode JWT header: {}", e);
            AuthError::InvalidToken
        })?;

        let (key, algorithm) = self.resolve_key(&header).await?;

        let claims = decode::<ClerkClaims>(token, &key, &self.validation(algorithm))
            .map_err(|e| {
                tracing::debug!("Token validation failed: {}", e);
                AuthError::InvalidToken
            })?
            .claims;

        self.check_authorized_party(claims.azp.as_deref())?;

        let external_user_id = ExternalUserId::new(claims.sub.clone()).map_err(|_| {
            tracing::warn!("Token has empty subject");
            AuthError::InvalidToken
        })?;

        let mut subject = AuthenticatedSubject::new(external_user_id);
        if let Some(org) = claims.active_org() {
            if let Ok(org) = ExternalOrgId::new(org) {
                subject = subject.with_active_org(org);
            }
        }
        Ok(subject)
    }
}

impl std::fmt::Debug for ClerkSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = match &self.keys {
            KeyMaterial::Remote { url, .. } => url.as_str(),
            KeyMaterial::Static { .. } => "static",
        };
        f.debug_struct("ClerkSessionValidator")
            .field("keys", &source)
            .field("issuer", &self.issuer)
            .field("authorized_parties", &self.authorized_parties)
            .finish_non_exhaustive()
    }
}
