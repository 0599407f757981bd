//! Role Registry
//!
//! Static role → capability table. Financial and administrative pages are
//! admin-only; nothing in this table changes at runtime.

use super::Role;
use crate::routing::{RouteId, ViewId};
use crate::AccessResult;
use std::collections::HashSet;

/// Read-only mapping from role to the routes it may open and its landing view
pub struct RoleRegistry;

impl RoleRegistry {
    /// Routes the given role may access
    pub fn permitted_routes(role: Role) -> HashSet<RouteId> {
        use RouteId::*;

        match role {
            Role::Admin => RouteId::PROTECTED.into_iter().collect(),
            Role::Doctor => [Dashboard, Patients, Appointments, Staff].into_iter().collect(),
            Role::Caregiver => [Dashboard, Patients, Appointments].into_iter().collect(),
            Role::Patient => [Dashboard].into_iter().collect(),
        }
    }

    /// Same as [`RoleRegistry::permitted_routes`] for a role given by name.
    ///
    /// Unrecognized names fail with `UnknownRole`; they never map to a
    /// default capability set.
    pub fn permitted_routes_by_name(role: &str) -> AccessResult<HashSet<RouteId>> {
        Ok(Self::permitted_routes(role.parse()?))
    }

    /// Whether `role` may open `route`
    pub fn can_access(role: Role, route: RouteId) -> bool {
        Self::permitted_routes(role).contains(&route)
    }

    /// Roles that may open `route`, in registry order
    pub fn roles_for(route: RouteId) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|role| Self::can_access(*role, route))
            .collect()
    }

    /// The dashboard a role lands on
    pub fn default_view(role: Role) -> ViewId {
        match role {
            Role::Admin => ViewId::AdminDashboard,
            Role::Doctor => ViewId::DoctorDashboard,
            Role::Caregiver => ViewId::CaregiverDashboard,
            Role::Patient => ViewId::PatientDashboard,
        }
    }
}
