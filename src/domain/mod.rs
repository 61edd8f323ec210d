//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, auth)
//! - `user` - Users mirrored from the identity provider
//! - `organization` - Organizations, memberships, and roles
//! - `webhook` - Webhook verification and event parsing

pub mod foundation;
pub mod organization;
pub mod user;
pub mod webhook;
