//! Route guards
//!
//! Stateless gatekeepers evaluated on every navigation. A guard reads the
//! current session and returns one of three terminal decisions:
//!
//! - `Allow`: render the route's content
//! - `Deny`: a signed-in user whose role may not see the route; the caller
//!   renders the access-denied view in place
//! - `Redirect`: navigate somewhere else
//!
//! Unauthenticated access to any protected route always redirects to the
//! login page. Access-denied is reserved for signed-in users.

use super::routes::{RouteAccess, HOME_PATH, LOGIN_PATH};
use crate::auth::{Identity, Role};
use crate::session::{Session, SessionStore};
use std::collections::HashSet;
use tracing::debug;

/// Who is asking, as far as a guard cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState<'a> {
    Authenticated(&'a Identity),
    Unauthenticated,
}

impl<'a> AuthState<'a> {
    pub fn of(session: &'a Session) -> Self {
        match &session.identity {
            Some(identity) => AuthState::Authenticated(identity),
            None => AuthState::Unauthenticated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Deny { role: Role },
    Redirect { to: &'static str },
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }
}

pub trait RouteGuard: Send + Sync {
    /// Decide for an already-taken session snapshot
    fn evaluate(&self, session: &Session) -> GuardDecision;

    /// Decide against the store's current session
    fn check(&self, store: &SessionStore) -> GuardDecision {
        self.evaluate(&store.snapshot())
    }
}

/// Guard for routes that need a signed-in user, optionally of given roles
#[derive(Debug, Clone, Default)]
pub struct ProtectedGuard {
    allowed_roles: Option<HashSet<Role>>,
}

impl ProtectedGuard {
    /// Any signed-in user may pass
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the listed roles may pass
    pub fn with_roles<I: IntoIterator<Item = Role>>(roles: I) -> Self {
        Self {
            allowed_roles: Some(roles.into_iter().collect()),
        }
    }

    pub fn allowed_roles(&self) -> Option<&HashSet<Role>> {
        self.allowed_roles.as_ref()
    }
}

impl RouteGuard for ProtectedGuard {
    fn evaluate(&self, session: &Session) -> GuardDecision {
        let decision = match AuthState::of(session) {
            AuthState::Unauthenticated => GuardDecision::Redirect { to: LOGIN_PATH },
            AuthState::Authenticated(identity) => match &self.allowed_roles {
                Some(roles) if !roles.contains(&identity.role()) => GuardDecision::Deny {
                    role: identity.role(),
                },
                _ => GuardDecision::Allow,
            },
        };
        debug!(?decision, "Protected route evaluated");
        decision
    }
}

/// Guard for pages only signed-out users should see, such as the login page
#[derive(Debug, Clone)]
pub struct PublicGuard {
    redirect_to: &'static str,
}

impl PublicGuard {
    /// Signed-in users are sent to the home location
    pub fn new() -> Self {
        Self {
            redirect_to: HOME_PATH,
        }
    }
}

impl Default for PublicGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteGuard for PublicGuard {
    fn evaluate(&self, session: &Session) -> GuardDecision {
        let decision = match AuthState::of(session) {
            AuthState::Authenticated(_) => GuardDecision::Redirect {
                to: self.redirect_to,
            },
            AuthState::Unauthenticated => GuardDecision::Allow,
        };
        debug!(?decision, "Public route evaluated");
        decision
    }
}

impl RouteAccess {
    /// The guard enforcing this access rule
    pub fn guard(&self) -> Box<dyn RouteGuard> {
        match self {
            RouteAccess::Roles(roles) => {
                Box::new(ProtectedGuard::with_roles(roles.iter().copied()))
            }
            RouteAccess::AnyAuthenticated => Box::new(ProtectedGuard::new()),
            RouteAccess::PublicOnly => Box::new(PublicGuard::new()),
        }
    }
}
