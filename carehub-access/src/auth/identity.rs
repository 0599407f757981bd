//! User Identity
//!
//! An identity carries exactly one role. Role-specific attributes live on the
//! role variant itself, so a doctor always has a specialty and an admin never
//! carries a patient id.

use crate::{AccessError, AccessResult};
use serde::{Deserialize, Serialize};

/// The closed set of roles
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Doctor,
    Caregiver,
    Patient,
}

impl Role {
    /// Every role, in registry order
    pub const ALL: [Role; 4] = [Role::Admin, Role::Doctor, Role::Caregiver, Role::Patient];

    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Caregiver => "caregiver",
            Role::Patient => "patient",
        }
    }

    /// Label shown next to demo accounts on the login screen
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrador",
            Role::Doctor => "Médico",
            Role::Caregiver => "Cuidador",
            Role::Patient => "Paciente",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "doctor" => Ok(Role::Doctor),
            "caregiver" => Ok(Role::Caregiver),
            "patient" => Ok(Role::Patient),
            _ => Err(AccessError::unknown_role(s)),
        }
    }
}

/// Role plus the attributes only that role has
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleProfile {
    Admin,
    Doctor { specialty: String },
    Caregiver { license: String },
    Patient { patient_id: String },
}

impl RoleProfile {
    pub fn role(&self) -> Role {
        match self {
            RoleProfile::Admin => Role::Admin,
            RoleProfile::Doctor { .. } => Role::Doctor,
            RoleProfile::Caregiver { .. } => Role::Caregiver,
            RoleProfile::Patient { .. } => Role::Patient,
        }
    }
}

/// An authenticated principal.
///
/// Fields are read-only after construction; in particular the role cannot be
/// changed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IdentityRecord", into = "IdentityRecord")]
pub struct Identity {
    id: String,
    display_name: String,
    email: String,
    avatar: Option<String>,
    profile: RoleProfile,
}

impl Identity {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        email: impl Into<String>,
        profile: RoleProfile,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            email: email.into(),
            avatar: None,
            profile,
        }
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    pub fn profile(&self) -> &RoleProfile {
        &self.profile
    }

    pub fn role(&self) -> Role {
        self.profile.role()
    }

    /// Header string, e.g. `Ana Costa (caregiver)`
    pub fn display_string(&self) -> String {
        format!("{} ({})", self.display_name, self.role())
    }
}

/// Flat serialized form of an [`Identity`].
///
/// This is the shape written to local storage and read from config files.
/// Converting it back into an `Identity` rejects unknown roles and missing
/// role attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "patientId")]
    pub patient_id: Option<String>,
}

fn required(value: Option<String>, field: &str, role: Role) -> AccessResult<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AccessError::malformed(format!(
            "{} identity is missing '{}'",
            role, field
        ))),
    }
}

impl TryFrom<IdentityRecord> for Identity {
    type Error = AccessError;

    fn try_from(record: IdentityRecord) -> AccessResult<Self> {
        let role: Role = record.role.parse()?;

        let profile = match role {
            Role::Admin => RoleProfile::Admin,
            Role::Doctor => RoleProfile::Doctor {
                specialty: required(record.specialty, "specialty", role)?,
            },
            Role::Caregiver => RoleProfile::Caregiver {
                license: required(record.license, "license", role)?,
            },
            Role::Patient => RoleProfile::Patient {
                patient_id: required(record.patient_id, "patientId", role)?,
            },
        };

        if record.id.is_empty() || record.email.is_empty() {
            return Err(AccessError::malformed("identity is missing id or email"));
        }

        Ok(Identity {
            id: record.id,
            display_name: record.name,
            email: record.email,
            avatar: record.avatar.filter(|a| !a.is_empty()),
            profile,
        })
    }
}

impl From<Identity> for IdentityRecord {
    fn from(identity: Identity) -> Self {
        let role = identity.role().as_str().to_string();
        let (specialty, license, patient_id) = match identity.profile {
            RoleProfile::Admin => (None, None, None),
            RoleProfile::Doctor { specialty } => (Some(specialty), None, None),
            RoleProfile::Caregiver { license } => (None, Some(license), None),
            RoleProfile::Patient { patient_id } => (None, None, Some(patient_id)),
        };

        Self {
            id: identity.id,
            name: identity.display_name,
            email: identity.email,
            role,
            avatar: identity.avatar,
            specialty,
            license,
            patient_id,
        }
    }
}

impl From<carehub_core::AccountConfig> for IdentityRecord {
    fn from(account: carehub_core::AccountConfig) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
            role: account.role,
            avatar: account.avatar,
            specialty: account.specialty,
            license: account.license,
            patient_id: account.patient_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(role: &str) -> IdentityRecord {
        IdentityRecord {
            id: "2".to_string(),
            name: "Dr. João Santos".to_string(),
            email: "joao@healthcare.com".to_string(),
            role: role.to_string(),
            avatar: None,
            specialty: Some("Cardiologia".to_string()),
            license: None,
            patient_id: None,
        }
    }

    #[test]
    fn test_role_names_parse_exactly() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!(matches!(
            "Admin".parse::<Role>(),
            Err(AccessError::UnknownRole { .. })
        ));
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_doctor_record_becomes_doctor_profile() {
        let identity = Identity::try_from(record("doctor")).unwrap();
        assert_eq!(identity.role(), Role::Doctor);
        assert_eq!(
            identity.profile(),
            &RoleProfile::Doctor {
                specialty: "Cardiologia".to_string()
            }
        );
        assert_eq!(identity.display_string(), "Dr. João Santos (doctor)");
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let err = Identity::try_from(record("nurse")).unwrap_err();
        assert!(matches!(err, AccessError::UnknownRole { role } if role == "nurse"));
    }

    #[test]
    fn test_caregiver_without_license_is_rejected() {
        let err = Identity::try_from(record("caregiver")).unwrap_err();
        assert!(matches!(err, AccessError::MalformedPersistedSession { .. }));
    }

    #[test]
    fn test_admin_ignores_foreign_attributes() {
        let identity = Identity::try_from(record("admin")).unwrap();
        assert_eq!(identity.profile(), &RoleProfile::Admin);
        assert_eq!(IdentityRecord::from(identity).specialty, None);
    }

    #[test]
    fn test_json_shape_matches_stored_users() {
        let identity = Identity::new(
            "4",
            "Carlos Oliveira",
            "carlos@patient.com",
            RoleProfile::Patient {
                patient_id: "P001".to_string(),
            },
        );

        let value = serde_json::to_value(&identity).unwrap();
        assert_eq!(value["role"], "patient");
        assert_eq!(value["patientId"], "P001");
        assert!(value.get("specialty").is_none());

        let back: Identity = serde_json::from_value(value).unwrap();
        assert_eq!(back, identity);
    }

    #[test]
    fn test_avatar_is_kept_and_empty_avatar_dropped() {
        let identity = Identity::new(
            "1",
            "Dr. Maria Silva",
            "maria@healthcare.com",
            RoleProfile::Admin,
        )
        .with_avatar("/avatars/maria.png");
        assert_eq!(identity.avatar(), Some("/avatars/maria.png"));

        let record = IdentityRecord::from(identity.clone());
        assert_eq!(Identity::try_from(record.clone()).unwrap(), identity);

        let blank = IdentityRecord {
            avatar: Some(String::new()),
            ..record
        };
        assert_eq!(Identity::try_from(blank).unwrap().avatar(), None);
    }
}
