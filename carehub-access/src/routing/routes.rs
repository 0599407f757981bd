//! Route table
//!
//! Every path the application knows, with the access rule that gates it.
//! Protected routes take their role sets from the role registry so the two
//! never disagree.

use crate::auth::{Role, RoleRegistry};
use std::collections::HashSet;

/// Home location for signed-in users
pub const HOME_PATH: &str = "/";

/// Where unauthenticated users are sent
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RouteId {
    Dashboard,
    Patients,
    Appointments,
    Finance,
    Staff,
    Reports,
    Analytics,
    Settings,
    Login,
    Landing,
}

impl RouteId {
    /// Routes that require a signed-in user
    pub const PROTECTED: [RouteId; 8] = [
        RouteId::Dashboard,
        RouteId::Patients,
        RouteId::Appointments,
        RouteId::Finance,
        RouteId::Staff,
        RouteId::Reports,
        RouteId::Analytics,
        RouteId::Settings,
    ];

    /// Routes only shown to signed-out users
    pub const PUBLIC: [RouteId; 2] = [RouteId::Login, RouteId::Landing];

    pub fn path(&self) -> &'static str {
        match self {
            RouteId::Dashboard => HOME_PATH,
            RouteId::Patients => "/pacientes",
            RouteId::Appointments => "/agendamentos",
            RouteId::Finance => "/financeiro",
            RouteId::Staff => "/profissionais",
            RouteId::Reports => "/relatorios",
            RouteId::Analytics => "/analytics",
            RouteId::Settings => "/configuracoes",
            RouteId::Login => LOGIN_PATH,
            RouteId::Landing => "/landing",
        }
    }

    pub fn is_public(&self) -> bool {
        Self::PUBLIC.contains(self)
    }
}

impl std::fmt::Display for RouteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Who may open a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAccess {
    /// Only the listed roles
    Roles(HashSet<Role>),
    /// Any signed-in user
    AnyAuthenticated,
    /// Signed-out users only; signed-in users are redirected home
    PublicOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub route: RouteId,
    pub path: &'static str,
    pub access: RouteAccess,
}

impl RouteDescriptor {
    pub fn new(route: RouteId, access: RouteAccess) -> Self {
        Self {
            route,
            path: route.path(),
            access,
        }
    }

    /// Descriptor whose role set comes from the registry; routes every role
    /// may open become `AnyAuthenticated`
    pub fn from_registry(route: RouteId) -> Self {
        if route.is_public() {
            return Self::new(route, RouteAccess::PublicOnly);
        }

        let roles: HashSet<Role> = RoleRegistry::roles_for(route).into_iter().collect();
        if roles.len() == Role::ALL.len() {
            Self::new(route, RouteAccess::AnyAuthenticated)
        } else {
            Self::new(route, RouteAccess::Roles(roles))
        }
    }
}

/// Static path → descriptor table
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDescriptor>) -> Self {
        Self { routes }
    }

    /// The application's routes
    pub fn standard() -> Self {
        let routes = RouteId::PROTECTED
            .into_iter()
            .chain(RouteId::PUBLIC)
            .map(RouteDescriptor::from_registry)
            .collect();
        Self::new(routes)
    }

    /// Exact path lookup; a single trailing slash is ignored
    pub fn lookup(&self, path: &str) -> Option<&RouteDescriptor> {
        let normalized = match path.strip_suffix('/') {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => path,
        };
        self.routes.iter().find(|d| d.path == normalized)
    }

    pub fn get(&self, route: RouteId) -> Option<&RouteDescriptor> {
        self.routes.iter().find(|d| d.route == route)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.routes.iter()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}
