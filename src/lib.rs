//! Identity Sync - users, organizations, and memberships mirrored from the
//! identity provider.
//!
//! Webhook deliveries keep the local store in step with the provider; a small
//! bearer-authenticated API reads it back.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
