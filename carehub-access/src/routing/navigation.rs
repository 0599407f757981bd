//! Navigation shell and router
//!
//! The sidebar menu filtered by role, and a navigator that runs a path
//! through the route table, its guard and the view dispatcher.

use super::dispatcher::{ViewDispatcher, ViewId};
use super::guard::GuardDecision;
use super::routes::{RouteId, RouteTable};
use crate::auth::{Role, RoleRegistry};
use crate::session::SessionStore;
use std::sync::Arc;
use tracing::debug;

/// One sidebar entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub title: &'static str,
    pub route: RouteId,
}

impl MenuItem {
    pub fn path(&self) -> &'static str {
        self.route.path()
    }
}

/// Every sidebar entry, in display order
pub const MENU_ITEMS: [MenuItem; 8] = [
    MenuItem {
        title: "Dashboard",
        route: RouteId::Dashboard,
    },
    MenuItem {
        title: "Pacientes",
        route: RouteId::Patients,
    },
    MenuItem {
        title: "Agendamentos",
        route: RouteId::Appointments,
    },
    MenuItem {
        title: "Financeiro",
        route: RouteId::Finance,
    },
    MenuItem {
        title: "Profissionais",
        route: RouteId::Staff,
    },
    MenuItem {
        title: "Relatórios",
        route: RouteId::Reports,
    },
    MenuItem {
        title: "Analytics",
        route: RouteId::Analytics,
    },
    MenuItem {
        title: "Configurações",
        route: RouteId::Settings,
    },
];

pub struct NavigationShell;

impl NavigationShell {
    /// Menu entries `role` may follow, keeping the sidebar order
    pub fn visible_menu_items(role: Role) -> Vec<MenuItem> {
        let permitted = RoleRegistry::permitted_routes(role);
        MENU_ITEMS
            .into_iter()
            .filter(|item| permitted.contains(&item.route))
            .collect()
    }
}

/// Result of navigating to a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Mount this view
    Render(ViewId),
    /// Signed in, but the role may not open the route
    Denied { route: RouteId, role: Role },
    /// Go to another path instead
    Redirect { to: &'static str },
    /// No route matches the path
    NotFound,
}

/// Router over the session store and the route table
pub struct Navigator {
    store: Arc<SessionStore>,
    routes: RouteTable,
}

impl Navigator {
    pub fn new(store: Arc<SessionStore>, routes: RouteTable) -> Self {
        Self { store, routes }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Decide what happens when the user opens `path`
    pub fn navigate(&self, path: &str) -> NavigationOutcome {
        let Some(descriptor) = self.routes.lookup(path) else {
            debug!(path = %path, "No route for path");
            return NavigationOutcome::NotFound;
        };

        let session = self.store.snapshot();
        let outcome = match descriptor.access.guard().evaluate(&session) {
            GuardDecision::Redirect { to } => NavigationOutcome::Redirect { to },
            GuardDecision::Deny { role } => NavigationOutcome::Denied {
                route: descriptor.route,
                role,
            },
            GuardDecision::Allow => match session.role() {
                Some(role) => {
                    NavigationOutcome::Render(ViewDispatcher::view_for(descriptor.route, role))
                }
                None => match ViewDispatcher::public_view(descriptor.route) {
                    Some(view) => NavigationOutcome::Render(view),
                    None => NavigationOutcome::NotFound,
                },
            },
        };

        debug!(path = %path, ?outcome, "Navigation resolved");
        outcome
    }

    /// Sidebar for the current session; empty when signed out
    pub fn menu(&self) -> Vec<MenuItem> {
        self.store
            .snapshot()
            .role()
            .map(NavigationShell::visible_menu_items)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(role: Role) -> Vec<&'static str> {
        NavigationShell::visible_menu_items(role)
            .iter()
            .map(|item| item.title)
            .collect()
    }

    #[test]
    fn test_admin_sees_the_whole_menu_in_order() {
        assert_eq!(NavigationShell::visible_menu_items(Role::Admin), MENU_ITEMS.to_vec());
    }

    #[test]
    fn test_doctor_menu_keeps_sidebar_order() {
        assert_eq!(
            titles(Role::Doctor),
            ["Dashboard", "Pacientes", "Agendamentos", "Profissionais"]
        );
    }

    #[test]
    fn test_caregiver_and_patient_menus() {
        assert_eq!(titles(Role::Caregiver), ["Dashboard", "Pacientes", "Agendamentos"]);
        assert_eq!(titles(Role::Patient), ["Dashboard"]);
    }

    #[test]
    fn test_menu_never_offers_a_forbidden_route() {
        for role in Role::ALL {
            for item in NavigationShell::visible_menu_items(role) {
                assert!(RoleRegistry::can_access(role, item.route));
            }
        }
    }

    #[test]
    fn test_signed_out_navigator_has_empty_menu() {
        let navigator = Navigator::new(Arc::new(SessionStore::in_memory()), RouteTable::standard());
        assert!(navigator.menu().is_empty());
        assert_eq!(navigator.navigate("/missing"), NavigationOutcome::NotFound);
    }
}
