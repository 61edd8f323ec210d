//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod organization;
pub mod user;
pub mod webhook;

pub use organization::{
    CheckOrganizationAccessHandler, CheckOrganizationAccessQuery, ListUserOrganizationsHandler,
    ListUserOrganizationsQuery,
};
pub use user::{GetCurrentUserHandler, GetCurrentUserQuery};
pub use webhook::{
    EventReconciler, HandleIdentityWebhookCommand, HandleIdentityWebhookHandler,
    ReconcileOutcome,
};
