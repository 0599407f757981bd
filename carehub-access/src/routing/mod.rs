//! Routing Module
//!
//! Route descriptors, the protected/public guards, the home view dispatcher
//! and the role-aware navigation menu.

pub mod dispatcher;
pub mod guard;
pub mod navigation;
pub mod routes;

pub use dispatcher::{ViewDispatcher, ViewId};
pub use guard::{AuthState, GuardDecision, ProtectedGuard, PublicGuard, RouteGuard};
pub use navigation::{MenuItem, NavigationOutcome, NavigationShell, Navigator};
pub use routes::{RouteAccess, RouteDescriptor, RouteId, RouteTable};
