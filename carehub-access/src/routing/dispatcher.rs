//! View Dispatcher
//!
//! Picks the view mounted at a route. The home location shows the signed-in
//! role's own dashboard.

use super::RouteId;
use crate::auth::{Role, RoleRegistry};
use crate::AccessResult;

/// Views the presentation layer can mount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewId {
    AdminDashboard,
    DoctorDashboard,
    CaregiverDashboard,
    PatientDashboard,
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

impl ViewId {
    pub fn name(&self) -> &'static str {
        match self {
            ViewId::AdminDashboard => "admin-dashboard",
            ViewId::DoctorDashboard => "doctor-dashboard",
            ViewId::CaregiverDashboard => "caregiver-dashboard",
            ViewId::PatientDashboard => "patient-dashboard",
            ViewId::Patients => "patients",
            ViewId::Appointments => "appointments",
            ViewId::Finance => "finance",
            ViewId::Staff => "staff",
            ViewId::Reports => "reports",
            ViewId::Analytics => "analytics",
            ViewId::Settings => "settings",
            ViewId::Login => "login",
            ViewId::Landing => "landing",
        }
    }
}

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub struct ViewDispatcher;

impl ViewDispatcher {
    /// Landing dashboard for a role
    pub fn resolve(role: Role) -> ViewId {
        RoleRegistry::default_view(role)
    }

    /// Landing dashboard for a role given by name; unknown names fail with
    /// `UnknownRole` rather than falling back to some dashboard
    pub fn resolve_name(role: &str) -> AccessResult<ViewId> {
        Ok(Self::resolve(role.parse()?))
    }

    /// View mounted at `route` for a user with `role`
    pub fn view_for(route: RouteId, role: Role) -> ViewId {
        match route {
            RouteId::Dashboard => Self::resolve(role),
            RouteId::Patients => ViewId::Patients,
            RouteId::Appointments => ViewId::Appointments,
            RouteId::Finance => ViewId::Finance,
            RouteId::Staff => ViewId::Staff,
            RouteId::Reports => ViewId::Reports,
            RouteId::Analytics => ViewId::Analytics,
            RouteId::Settings => ViewId::Settings,
            RouteId::Login => ViewId::Login,
            RouteId::Landing => ViewId::Landing,
        }
    }

    /// View mounted at a public route
    pub fn public_view(route: RouteId) -> Option<ViewId> {
        match route {
            RouteId::Login => Some(ViewId::Login),
            RouteId::Landing => Some(ViewId::Landing),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AccessError;

    #[test]
    fn test_each_role_gets_its_dashboard() {
        assert_eq!(ViewDispatcher::resolve(Role::Admin), ViewId::AdminDashboard);
        assert_eq!(ViewDispatcher::resolve(Role::Doctor), ViewId::DoctorDashboard);
        assert_eq!(
            ViewDispatcher::resolve(Role::Caregiver),
            ViewId::CaregiverDashboard
        );
        assert_eq!(
            ViewDispatcher::resolve(Role::Patient),
            ViewId::PatientDashboard
        );
    }

    #[test]
    fn test_unknown_role_does_not_fall_back_to_admin() {
        assert!(matches!(
            ViewDispatcher::resolve_name("janitor"),
            Err(AccessError::UnknownRole { .. })
        ));
        assert_eq!(
            ViewDispatcher::resolve_name("doctor").unwrap(),
            ViewId::DoctorDashboard
        );
    }

    #[test]
    fn test_home_route_depends_on_role_other_routes_do_not() {
        assert_eq!(
            ViewDispatcher::view_for(RouteId::Dashboard, Role::Patient),
            ViewId::PatientDashboard
        );
        assert_eq!(
            ViewDispatcher::view_for(RouteId::Finance, Role::Admin),
            ViewId::Finance
        );
        assert_eq!(ViewDispatcher::public_view(RouteId::Login), Some(ViewId::Login));
        assert_eq!(ViewDispatcher::public_view(RouteId::Staff), None);
    }
}
