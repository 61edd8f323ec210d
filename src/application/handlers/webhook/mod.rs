//! Identity provider webhook handlers.
//!
//! `HandleIdentityWebhookHandler` verifies and parses a delivery;
//! `EventReconciler` applies the parsed event to storage.

mod handle_identity_webhook;
mod reconciler;

pub use handle_identity_webhook::{HandleIdentityWebhookCommand, HandleIdentityWebhookHandler};
pub use reconciler::{EventReconciler, ReconcileOutcome};
