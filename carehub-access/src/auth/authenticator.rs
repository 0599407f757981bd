//! Authenticator
//!
//! Opens and closes sessions. A login suspends while the identity provider
//! answers; during that time the session reports `pending` and a second login
//! is rejected with `LoginAlreadyInProgress`.

use super::{Identity, IdentityProvider};
use crate::session::{Session, SessionStore};
use crate::AccessResult;
use carehub_core::{log_operation_error, log_operation_start, log_operation_success};
use std::sync::Arc;
use tracing::{info, warn};

pub struct Authenticator {
    store: Arc<SessionStore>,
    provider: Arc<dyn IdentityProvider>,
}

impl Authenticator {
    pub fn new(store: Arc<SessionStore>, provider: Arc<dyn IdentityProvider>) -> Self {
        Self { store, provider }
    }

    /// Sign in with an email and secret.
    ///
    /// On success the identity is persisted and becomes the session. On any
    /// failure the previous session is left as it was. Dropping the returned
    /// future before it resolves releases the pending flag without touching
    /// the session.
    pub async fn login(&self, email: &str, secret: &str) -> AccessResult<Identity> {
        let attempt = self.store.begin_attempt()?;
        log_operation_start!("login", email = %email);

        match self.provider.authenticate(email, secret).await {
            Ok(identity) => {
                if let Err(e) = attempt.complete(identity.clone()) {
                    log_operation_error!("login", e, email = %email);
                    return Err(e);
                }
                log_operation_success!("login", user = %identity.id(), role = %identity.role());
                Ok(identity)
            }
            Err(e) => {
                drop(attempt);
                info!(email = %email, error = %e, "Login rejected");
                Err(e)
            }
        }
    }

    /// Sign out. Safe to call when nobody is signed in.
    pub fn logout(&self) {
        let previous = self.store.current_identity();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Session cleared but stored record could not be removed");
        }
        match previous {
            Some(identity) => info!(user = %identity.id(), "Logged out"),
            None => info!("Logout with no active session"),
        }
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.store.current_identity()
    }

    pub fn is_pending(&self) -> bool {
        self.store.is_pending()
    }

    pub fn session(&self) -> Session {
        self.store.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{IdentityDirectory, Role};
    use crate::AccessError;
    use std::time::Duration;

    fn authenticator(latency_ms: u64) -> Authenticator {
        let directory = IdentityDirectory::demo().with_latency(Duration::from_millis(latency_ms));
        Authenticator::new(Arc::new(SessionStore::in_memory()), Arc::new(directory))
    }

    #[tokio::test]
    async fn test_login_sets_session() {
        let auth = authenticator(1);
        let identity = auth.login("ana@healthcare.com", "demo").await.unwrap();

        assert_eq!(identity.role(), Role::Caregiver);
        assert!(auth.session().is_authenticated());
        assert_eq!(auth.current_identity(), Some(identity));
        assert!(!auth.is_pending());
    }

    #[tokio::test]
    async fn test_failed_login_keeps_previous_session() {
        let auth = authenticator(1);
        auth.login("maria@healthcare.com", "demo").await.unwrap();

        let result = auth.login("ana@healthcare.com", "wrong").await;
        assert!(matches!(result, Err(AccessError::InvalidCredentials)));
        assert_eq!(auth.session().role(), Some(Role::Admin));
        assert!(!auth.is_pending());
    }

    #[tokio::test]
    async fn test_pending_is_visible_while_suspended() {
        let auth = authenticator(50);

        let observed = async {
            tokio::task::yield_now().await;
            auth.is_pending()
        };
        let (result, was_pending) =
            tokio::join!(auth.login("joao@healthcare.com", "demo"), observed);

        assert!(result.is_ok());
        assert!(was_pending);
        assert!(!auth.is_pending());
    }

    #[tokio::test]
    async fn test_unknown_email_keeps_previous_session() {
        let auth = authenticator(1);
        let doctor = auth.login("joao@healthcare.com", "demo").await.unwrap();

        let result = auth.login("nobody@healthcare.com", "demo").await;
        assert!(matches!(result, Err(AccessError::InvalidCredentials)));
        assert_eq!(auth.current_identity(), Some(doctor));
        assert!(!auth.is_pending());
    }

    #[test]
    fn test_logout_twice_is_safe() {
        let auth = authenticator(0);
        auth.logout();
        auth.logout();
        assert!(auth.current_identity().is_none());
    }
}
