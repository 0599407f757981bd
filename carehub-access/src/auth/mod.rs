//! Authentication and Role Module
//!
//! Identities, the static role registry, the identity directory that stands in
//! for a backend, and the authenticator that opens and closes sessions.

pub mod authenticator;
pub mod directory;
pub mod identity;
pub mod registry;

pub use authenticator::Authenticator;
pub use directory::{DemoAccount, IdentityDirectory, IdentityProvider};
pub use identity::{Identity, IdentityRecord, Role, RoleProfile};
pub use registry::RoleRegistry;
