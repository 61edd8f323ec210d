//! User domain module.
//!
//! Users mirror the identity provider's user records. They are created or
//! updated only by webhook-driven upserts keyed by the provider's user id and
//! are never deleted here.

mod aggregate;

pub use aggregate::{User, UserProfile};
