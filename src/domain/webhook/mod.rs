//! Identity provider webhook domain.
//!
//! # Module Structure
//!
//! - `verifier` - Svix signature verification
//! - `event` - Envelope parsing and per-kind typed payloads
//! - `errors` - WebhookError with HTTP status mapping

mod errors;
mod event;
mod verifier;

pub use errors::WebhookError;
pub use event::{
    IdentityEvent, MembershipPayload, OrganizationPayload, UserPayload, WebhookEnvelope,
};
pub use verifier::{SvixHeaders, SvixWebhookVerifier, DEFAULT_TOLERANCE_SECS};
