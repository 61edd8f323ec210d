//! Webhook configuration (Svix signing)

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Inbound webhook settings.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Svix signing secret, `whsec_<base64>`
    pub signing_secret: SecretString,

    /// Allowed `svix-timestamp` drift in seconds
    #[serde(default = "default_tolerance")]
    pub tolerance_secs: i64,
}

impl WebhookConfig {
    pub fn new(signing_secret: impl Into<String>) -> Self {
        Self {
            signing_secret: SecretString::new(signing_secret.into()),
            tolerance_secs: default_tolerance(),
        }
    }

    /// Validate webhook configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let secret = self.signing_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("WEBHOOK__SIGNING_SECRET"));
        }
        if !secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidWebhookSecret);
        }
        if self.tolerance_secs <= 0 {
            return Err(ValidationError::InvalidWebhookTolerance);
        }
        Ok(())
    }
}

fn default_tolerance() -> i64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tolerance() {
        assert_eq!(WebhookConfig::new("whsec_abc").tolerance_secs, 300);
    }

    #[test]
    fn test_validation_missing_secret() {
        assert_eq!(
            WebhookConfig::new("").validate(),
            Err(ValidationError::MissingRequired("WEBHOOK__SIGNING_SECRET"))
        );
    }

    #[test]
    fn test_validation_requires_prefix() {
        assert_eq!(
            WebhookConfig::new("sk_live_abc").validate(),
            Err(ValidationError::InvalidWebhookSecret)
        );
    }

    #[test]
    fn test_validation_rejects_non_positive_tolerance() {
        let config = WebhookConfig {
            tolerance_secs: 0,
            ..WebhookConfig::new("whsec_abc")
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidWebhookTolerance)
        );
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let debug = format!("{:?}", WebhookConfig::new("whsec_supersecret"));
        assert!(!debug.contains("supersecret"));
    }
}
