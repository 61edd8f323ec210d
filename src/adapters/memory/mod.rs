//! In-memory adapters.
//!
//! `InMemoryDirectory` implements every persistence port over one shared
//! state. Useful for tests and for running the service without a database.

mod directory;

pub use directory::InMemoryDirectory;
