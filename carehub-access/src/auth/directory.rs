//! Identity Directory
//!
//! The set of known identities and the credential check against them. The
//! directory stands in for a backend: it waits for a configured latency
//! before answering, like a network round trip would.

use super::identity::{Identity, IdentityRecord, RoleProfile};
use crate::{AccessError, AccessResult};
use async_trait::async_trait;
use carehub_core::{validation_error, AuthConfig, DEFAULT_SHARED_SECRET};
use std::time::Duration;
use tracing::debug;

/// Source of identities for the authenticator.
///
/// A deployment backed by a real service implements this with a network call;
/// the authenticator's contract stays the same.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve credentials to an identity, or fail with `InvalidCredentials`
    async fn authenticate(&self, email: &str, secret: &str) -> AccessResult<Identity>;
}

/// Entry shown in the demo account list on the login screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoAccount {
    pub email: String,
    pub role_label: &'static str,
    pub secret: String,
}

/// In-memory identity directory with a single shared secret
pub struct IdentityDirectory {
    identities: Vec<Identity>,
    shared_secret: String,
    latency: Duration,
}

impl IdentityDirectory {
    /// Empty directory accepting `shared_secret`
    pub fn new(shared_secret: impl Into<String>, latency: Duration) -> Self {
        Self {
            identities: Vec::new(),
            shared_secret: shared_secret.into(),
            latency,
        }
    }

    /// The four demo accounts with the default secret and a one second delay
    pub fn demo() -> Self {
        let mut directory = Self::new(DEFAULT_SHARED_SECRET, Duration::from_millis(1000));
        directory.identities = Self::demo_identities();
        directory
    }

    /// Build a directory from the `[auth]` config section.
    ///
    /// Fails on accounts with an unknown role, missing role attributes or an
    /// email already present in the directory.
    pub fn from_config(config: &AuthConfig) -> AccessResult<Self> {
        let mut directory = Self::new(
            config.shared_secret.clone(),
            Duration::from_millis(config.login_latency_ms),
        );

        if config.include_demo_accounts {
            directory.identities = Self::demo_identities();
        }

        for account in &config.accounts {
            let identity = Identity::try_from(IdentityRecord::from(account.clone()))?;
            directory.add(identity)?;
        }

        Ok(directory)
    }

    /// Override the simulated latency
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Add an identity; emails must be unique
    pub fn add(&mut self, identity: Identity) -> AccessResult<()> {
        if self.find(identity.email()).is_some() {
            return Err(AccessError::Core(validation_error!(
                format!("Duplicate account email: {}", identity.email()),
                "auth.accounts.email",
                "identity_directory"
            )));
        }
        self.identities.push(identity);
        Ok(())
    }

    /// Exact, case-sensitive email lookup
    pub fn find(&self, email: &str) -> Option<&Identity> {
        self.identities.iter().find(|i| i.email() == email)
    }

    pub fn identities(&self) -> &[Identity] {
        &self.identities
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Accounts listed on the login screen, in directory order
    pub fn demo_accounts(&self) -> Vec<DemoAccount> {
        self.identities
            .iter()
            .map(|identity| DemoAccount {
                email: identity.email().to_string(),
                role_label: identity.role().label(),
                secret: self.shared_secret.clone(),
            })
            .collect()
    }

    fn demo_identities() -> Vec<Identity> {
        vec![
            Identity::new(
                "1",
                "Dr. Maria Silva",
                "maria@healthcare.com",
                RoleProfile::Admin,
            ),
            Identity::new(
                "2",
                "Dr. João Santos",
                "joao@healthcare.com",
                RoleProfile::Doctor {
                    specialty: "Cardiologia".to_string(),
                },
            ),
            Identity::new(
                "3",
                "Ana Costa",
                "ana@healthcare.com",
                RoleProfile::Caregiver {
                    license: "CRE-12345".to_string(),
                },
            ),
            Identity::new(
                "4",
                "Carlos Oliveira",
                "carlos@patient.com",
                RoleProfile::Patient {
                    patient_id: "P001".to_string(),
                },
            ),
        ]
    }
}

impl Default for IdentityDirectory {
    fn default() -> Self {
        Self::demo()
    }
}

#[async_trait]
impl IdentityProvider for IdentityDirectory {
    async fn authenticate(&self, email: &str, secret: &str) -> AccessResult<Identity> {
        tokio::time::sleep(self.latency).await;

        match self.find(email) {
            Some(identity) if secret == self.shared_secret => Ok(identity.clone()),
            Some(_) => {
                debug!(email = %email, "Secret mismatch");
                Err(AccessError::InvalidCredentials)
            }
            None => {
                debug!(email = %email, "No such account");
                Err(AccessError::InvalidCredentials)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use carehub_core::AccountConfig;

    fn fast() -> IdentityDirectory {
        IdentityDirectory::demo().with_latency(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_demo_secret_signs_in_every_demo_account() {
        let directory = fast();
        let expected = [
            ("maria@healthcare.com", Role::Admin),
            ("joao@healthcare.com", Role::Doctor),
            ("ana@healthcare.com", Role::Caregiver),
            ("carlos@patient.com", Role::Patient),
        ];

        for (email, role) in expected {
            let identity = directory.authenticate(email, "demo").await.unwrap();
            assert_eq!(identity.role(), role);
            assert_eq!(identity.email(), email);
        }
    }

    #[tokio::test]
    async fn test_wrong_secret_and_unknown_email_fail() {
        let directory = fast();
        assert!(matches!(
            directory.authenticate("ana@healthcare.com", "wrong").await,
            Err(AccessError::InvalidCredentials)
        ));
        assert!(matches!(
            directory.authenticate("nobody@healthcare.com", "demo").await,
            Err(AccessError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_email_match_is_case_sensitive() {
        let directory = fast();
        assert!(directory
            .authenticate("Ana@Healthcare.com", "demo")
            .await
            .is_err());
    }

    #[test]
    fn test_demo_accounts_carry_role_labels() {
        let accounts = IdentityDirectory::demo().demo_accounts();
        let labels: Vec<_> = accounts.iter().map(|a| a.role_label).collect();
        assert_eq!(labels, ["Administrador", "Médico", "Cuidador", "Paciente"]);
        assert!(accounts.iter().all(|a| a.secret == "demo"));
    }

    #[test]
    fn test_config_accounts_are_appended() {
        let config = AuthConfig {
            accounts: vec![AccountConfig {
                id: "5".to_string(),
                name: "Beatriz Lima".to_string(),
                email: "bia@healthcare.com".to_string(),
                role: "doctor".to_string(),
                avatar: None,
                specialty: Some("Geriatria".to_string()),
                license: None,
                patient_id: None,
            }],
            ..AuthConfig::default()
        };

        let directory = IdentityDirectory::from_config(&config).unwrap();
        assert_eq!(directory.identities().len(), 5);
        assert_eq!(
            directory.find("bia@healthcare.com").unwrap().role(),
            Role::Doctor
        );
        assert_eq!(directory.latency(), Duration::from_millis(1000));
    }

    #[test]
    fn test_config_account_with_unknown_role_fails() {
        let config = AuthConfig {
            include_demo_accounts: false,
            accounts: vec![AccountConfig {
                id: "6".to_string(),
                name: "Night Nurse".to_string(),
                email: "nurse@healthcare.com".to_string(),
                role: "nurse".to_string(),
                avatar: None,
                specialty: None,
                license: None,
                patient_id: None,
            }],
            ..AuthConfig::default()
        };

        assert!(matches!(
            IdentityDirectory::from_config(&config),
            Err(AccessError::UnknownRole { .. })
        ));
    }

    #[test]
    fn test_duplicate_email_is_rejected() {
        let mut directory = IdentityDirectory::demo();
        let dup = Identity::new("9", "Copy", "maria@healthcare.com", RoleProfile::Admin);
        assert!(matches!(directory.add(dup), Err(AccessError::Core(_))));
    }
}
