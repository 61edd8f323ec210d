//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `UserRepository` - Users keyed by internal and external id
//! - `OrganizationRepository` - Organizations, including the owner grant
//! - `MembershipRepository` - Links between users and organizations
//!
//! ## Authentication Ports
//!
//! - `SessionValidator` - Bearer token verification

mod membership_repository;
mod organization_repository;
mod session_validator;
mod user_repository;

pub use membership_repository::MembershipRepository;
pub use organization_repository::OrganizationRepository;
pub use session_validator::SessionValidator;
pub use user_repository::UserRepository;
