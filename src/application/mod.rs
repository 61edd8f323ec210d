//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Webhook ingestion is the only write path; everything served over the API
//! is a query.

pub mod handlers;

pub use handlers::{
    CheckOrganizationAccessHandler, CheckOrganizationAccessQuery, EventReconciler,
    GetCurrentUserHandler, GetCurrentUserQuery, HandleIdentityWebhookCommand,
    HandleIdentityWebhookHandler, ListUserOrganizationsHandler, ListUserOrganizationsQuery,
    ReconcileOutcome,
};
