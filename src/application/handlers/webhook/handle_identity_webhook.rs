//! HandleIdentityWebhookHandler - Command handler for identity provider webhooks.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use super::{EventReconciler, ReconcileOutcome};
use crate::domain::webhook::{
    IdentityEvent, SvixHeaders, SvixWebhookVerifier, WebhookEnvelope, WebhookError,
    DEFAULT_TOLERANCE_SECS,
};

/// Command carrying one raw delivery.
#[derive(Debug, Clone, Default)]
pub struct HandleIdentityWebhookCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    pub svix_id: Option<String>,
    pub svix_timestamp: Option<String>,
    pub svix_signature: Option<String>,
}

/// Handler for identity provider webhooks.
///
/// Steps, each with its own rejection:
///
/// 1. All three Svix headers present (`MissingHeaders`)
/// 2. Verifier built from the signing secret (`VerifierUnavailable`)
/// 3. Signature and timestamp verified (`InvalidSignature`, timestamp errors)
/// 4. Body parsed into an envelope (`InvalidJson`, `MissingEventType`)
///
/// Once these pass the delivery is accepted whatever reconciliation does;
/// the outcome is returned for logging.
pub struct HandleIdentityWebhookHandler {
    signing_secret: SecretString,
    tolerance_secs: i64,
    reconciler: Arc<EventReconciler>,
}

impl HandleIdentityWebhookHandler {
    pub fn new(signing_secret: SecretString, reconciler: Arc<EventReconciler>) -> Self {
        Self {
            signing_secret,
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
            reconciler,
        }
    }

    pub fn with_tolerance(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    pub async fn handle(
        &self,
        cmd: HandleIdentityWebhookCommand,
    ) -> Result<ReconcileOutcome, WebhookError> {
        let headers = SvixHeaders::new(
            cmd.svix_id.as_deref(),
            cmd.svix_timestamp.as_deref(),
            cmd.svix_signature.as_deref(),
        )?;

        let verifier = SvixWebhookVerifier::from_secret(self.signing_secret.expose_secret())
            .map_err(|e| {
                tracing::error!(error = %e, "Webhook verifier could not be initialized");
                e
            })?
            .with_tolerance(self.tolerance_secs);

        verifier.verify(&cmd.payload, &headers).map_err(|e| {
            tracing::warn!(svix_id = %headers.id, error = %e, "Webhook verification failed");
            e
        })?;

        let envelope = WebhookEnvelope::parse(&cmd.payload)?;
        let event = IdentityEvent::from_envelope(&envelope);

        let outcome = self.reconciler.reconcile(&event).await;
        match &outcome {
            ReconcileOutcome::Failed(reason) => tracing::error!(
                event_type = %envelope.event_type,
                svix_id = %headers.id,
                reason = %reason,
                "Webhook event could not be applied"
            ),
            other => tracing::info!(
                event_type = %envelope.event_type,
                kind = event.kind(),
                svix_id = %headers.id,
                outcome = %other,
                "Webhook processed"
            ),
        }

        Ok(outcome)
    }
}
