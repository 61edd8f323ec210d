//! Svix webhook signature verification.
//!
//! The identity provider delivers webhooks through Svix. Each delivery carries
//! three headers:
//!
//! - `svix-id` - unique message id
//! - `svix-timestamp` - Unix seconds at signing time
//! - `svix-signature` - space-separated `v1,<base64>` entries
//!
//! The signature is HMAC-SHA256 over `"{id}.{timestamp}.{body}"` keyed with the
//! base64-decoded part of the `whsec_...` secret.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::WebhookError;

/// Default tolerance for `svix-timestamp` drift in either direction (5 minutes).
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

const SECRET_PREFIX: &str = "whsec_";

/// The three Svix headers, already checked for presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvixHeaders {
    pub id: String,
    pub timestamp: String,
    pub signature: String,
}

impl SvixHeaders {
    /// Collects the headers, rejecting the delivery if any is absent or empty.
    pub fn new(
        id: Option<&str>,
        timestamp: Option<&str>,
        signature: Option<&str>,
    ) -> Result<Self, WebhookError> {
        match (non_empty(id), non_empty(timestamp), non_empty(signature)) {
            (Some(id), Some(timestamp), Some(signature)) => Ok(Self {
                id: id.to_string(),
                timestamp: timestamp.to_string(),
                signature: signature.to_string(),
            }),
            _ => Err(WebhookError::MissingHeaders),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Verifier for Svix-signed webhook deliveries.
pub struct SvixWebhookVerifier {
    key: Vec<u8>,
    tolerance_secs: i64,
}

impl SvixWebhookVerifier {
    /// Builds a verifier from a `whsec_<base64>` secret. The prefix is optional.
    ///
    /// # Errors
    ///
    /// `VerifierUnavailable` if the secret is empty or not valid base64.
    pub fn from_secret(secret: &str) -> Result<Self, WebhookError> {
        let encoded = secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret);
        if encoded.is_empty() {
            return Err(WebhookError::VerifierUnavailable(
                "signing secret is empty".to_string(),
            ));
        }

        let key = STANDARD.decode(encoded).map_err(|e| {
            WebhookError::VerifierUnavailable(format!("signing secret is not base64: {}", e))
        })?;

        Ok(Self {
            key,
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        })
    }

    /// Overrides the timestamp tolerance.
    pub fn with_tolerance(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    /// Verifies a delivery against the current clock.
    pub fn verify(&self, payload: &[u8], headers: &SvixHeaders) -> Result<(), WebhookError> {
        self.verify_at(payload, headers, chrono::Utc::now().timestamp())
    }

    /// Verifies a delivery as of `now` (Unix seconds).
    ///
    /// # Verification Steps
    ///
    /// 1. Parse and range-check `svix-timestamp`
    /// 2. Compute the expected `v1` signature
    /// 3. Accept if any `v1` entry matches in constant time
    pub fn verify_at(
        &self,
        payload: &[u8],
        headers: &SvixHeaders,
        now: i64,
    ) -> Result<(), WebhookError> {
        let timestamp: i64 = headers
            .timestamp
            .trim()
            .parse()
            .map_err(|_| WebhookError::InvalidTimestamp)?;

        let skew = now.checked_sub(timestamp).map(i64::unsigned_abs);
        if skew.map_or(true, |skew| skew > self.tolerance_secs.unsigned_abs()) {
            return Err(WebhookError::TimestampOutOfRange);
        }

        let expected = self.sign(&headers.id, timestamp, payload)?;

        let matched = headers
            .signature
            .split(' ')
            .filter_map(|entry| entry.split_once(','))
            .filter(|(version, _)| *version == "v1")
            .any(|(_, candidate)| constant_time_compare(expected.as_bytes(), candidate.as_bytes()));

        if matched {
            Ok(())
        } else {
            Err(WebhookError::InvalidSignature)
        }
    }

    /// Computes the base64 `v1` signature for a message.
    pub fn sign(&self, msg_id: &str, timestamp: i64, payload: &[u8]) -> Result<String, WebhookError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.key)
            .map_err(|e| WebhookError::VerifierUnavailable(e.to_string()))?;
        mac.update(msg_id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

impl std::fmt::Debug for SvixWebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvixWebhookVerifier")
            .field("key", &"[REDACTED]")
            .field("tolerance_secs", &self.tolerance_secs)
            .finish()
    }
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
