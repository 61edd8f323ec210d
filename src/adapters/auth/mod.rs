//! Authentication adapters.
//!
//! Implementations of the `SessionValidator` port:
//!
//! - `clerk` - Clerk session token verification (JWKS or static PEM key)
//! - `mock` - Token table for tests

mod clerk;
mod mock;

pub use clerk::{ClerkConfig, ClerkSessionValidator, ClerkSetupError};
pub use mock::MockSessionValidator;
