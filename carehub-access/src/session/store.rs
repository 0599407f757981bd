//! Session Store - The current identity and the pending-login flag
//!
//! One store is created per application and handed to every component that
//! needs it. Only the authenticator mutates it; everybody else reads
//! snapshots.

use super::storage::{decode_session, encode_session, KeyValueStore, MemoryStore};
use crate::auth::{Identity, Role};
use crate::{AccessError, AccessResult};
use carehub_core::DEFAULT_SESSION_KEY;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Point-in-time view of the session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// The signed-in identity, if any
    pub identity: Option<Identity>,
    /// True only while a login attempt is in flight
    pub pending: bool,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().map(Identity::role)
    }
}

#[derive(Default)]
struct SessionState {
    identity: Option<Identity>,
    pending: bool,
    restored: bool,
}

/// Holds the session and mirrors it into local storage
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
    key: String,
    state: RwLock<SessionState>,
}

impl SessionStore {
    /// Create an empty store. Storage is read on first access or on an
    /// explicit [`SessionStore::restore`].
    pub fn new(backend: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Create a store and restore any saved identity right away
    pub fn open(backend: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let store = Self::new(backend, key);
        store.restore();
        store
    }

    /// Store backed by a fresh [`MemoryStore`] under the default key
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), DEFAULT_SESSION_KEY)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reload the identity from storage.
    ///
    /// Never fails: a missing record leaves the session empty, and a corrupt
    /// record (bad JSON, unsupported version, unknown role) is discarded and
    /// also leaves the session empty.
    pub fn restore(&self) -> Option<Identity> {
        let mut state = self.state.write();
        self.restore_locked(&mut state)
    }

    /// Write `identity` to storage and make it the current session
    pub fn persist(&self, identity: Identity) -> AccessResult<()> {
        let mut state = self.state.write();
        self.write_record(&identity)?;
        state.identity = Some(identity);
        state.restored = true;
        Ok(())
    }

    /// Remove the stored identity and empty the session.
    ///
    /// The in-memory session is emptied even when storage cannot be updated.
    pub fn clear(&self) -> AccessResult<()> {
        let mut state = self.state.write();
        state.identity = None;
        state.restored = true;
        self.backend.remove(&self.key)
    }

    /// Current session, restoring from storage first if that has not happened
    pub fn snapshot(&self) -> Session {
        self.ensure_restored();
        let state = self.state.read();
        Session {
            identity: state.identity.clone(),
            pending: state.pending,
        }
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.snapshot().identity
    }

    pub fn is_pending(&self) -> bool {
        self.state.read().pending
    }

    /// Mark a login attempt as in flight.
    ///
    /// Fails with `LoginAlreadyInProgress` when another attempt holds the
    /// flag. The flag is released when the returned guard is completed or
    /// dropped, so a cancelled login never leaves it set.
    pub(crate) fn begin_attempt(&self) -> AccessResult<PendingAttempt<'_>> {
        self.ensure_restored();
        let mut state = self.state.write();
        if state.pending {
            return Err(AccessError::LoginAlreadyInProgress);
        }
        state.pending = true;
        debug!("Login attempt started");
        Ok(PendingAttempt {
            store: self,
            finished: false,
        })
    }

    fn ensure_restored(&self) {
        if self.state.read().restored {
            return;
        }
        // Load under the write lock so a concurrent persist cannot be
        // overwritten by the older stored value.
        let mut state = self.state.write();
        if !state.restored {
            self.restore_locked(&mut state);
        }
    }

    fn restore_locked(&self, state: &mut SessionState) -> Option<Identity> {
        let loaded = match self.load() {
            Ok(identity) => identity,
            Err(AccessError::MalformedPersistedSession { message }) => {
                warn!(key = %self.key, reason = %message, "Discarding malformed stored session");
                self.discard_record();
                None
            }
            Err(AccessError::UnknownRole { role }) => {
                warn!(key = %self.key, role = %role, "Discarding stored session with unknown role");
                self.discard_record();
                None
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Could not read stored session");
                None
            }
        };

        if let Some(identity) = &loaded {
            info!(user = %identity.id(), role = %identity.role(), "Restored session");
        }

        state.identity = loaded.clone();
        state.restored = true;
        loaded
    }

    fn load(&self) -> AccessResult<Option<Identity>> {
        match self.backend.get(&self.key)? {
            Some(raw) => decode_session(&raw).map(Some),
            None => Ok(None),
        }
    }

    fn write_record(&self, identity: &Identity) -> AccessResult<()> {
        let raw = encode_session(identity)?;
        self.backend.set(&self.key, &raw)
    }

    fn discard_record(&self) {
        if let Err(e) = self.backend.remove(&self.key) {
            warn!(key = %self.key, error = %e, "Failed to remove stored session");
        }
    }
}

/// Guard for an in-flight login
pub(crate) struct PendingAttempt<'a> {
    store: &'a SessionStore,
    finished: bool,
}

impl PendingAttempt<'_> {
    /// Persist the identity and clear the pending flag in one step, so no
    /// reader sees the identity while the attempt still looks in flight.
    pub(crate) fn complete(mut self, identity: Identity) -> AccessResult<()> {
        let mut state = self.store.state.write();
        self.finished = true;
        state.pending = false;
        self.store.write_record(&identity)?;
        state.identity = Some(identity);
        state.restored = true;
        Ok(())
    }
}

impl Drop for PendingAttempt<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.store.state.write().pending = false;
            debug!("Login attempt released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::RoleProfile;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn admin() -> Identity {
        Identity::new("1", "Dr. Maria Silva", "maria@healthcare.com", RoleProfile::Admin)
    }

    fn shared_backend() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    #[test]
    fn test_starts_empty() {
        let store = SessionStore::in_memory();
        assert_eq!(store.snapshot(), Session::default());
        assert!(!store.is_pending());
    }

    #[test]
    fn test_persist_then_reload_yields_same_identity() {
        let backend = shared_backend();
        let store = SessionStore::new(backend.clone(), DEFAULT_SESSION_KEY);
        store.persist(admin()).unwrap();

        let reloaded = SessionStore::open(backend, DEFAULT_SESSION_KEY);
        assert_eq!(reloaded.current_identity(), Some(admin()));
    }

    #[test]
    fn test_corrupted_record_restores_empty_and_is_discarded() {
        let backend = shared_backend();
        backend.set(DEFAULT_SESSION_KEY, "{not json").unwrap();

        let store = SessionStore::new(backend.clone(), DEFAULT_SESSION_KEY);
        assert_eq!(store.restore(), None);
        assert!(store.snapshot().identity.is_none());
        assert_eq!(backend.get(DEFAULT_SESSION_KEY).unwrap(), None);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = SessionStore::in_memory();
        store.persist(admin()).unwrap();

        store.clear().unwrap();
        assert!(store.current_identity().is_none());
        store.clear().unwrap();
        assert!(store.current_identity().is_none());
    }

    #[test]
    fn test_snapshot_restores_lazily() {
        let backend = shared_backend();
        SessionStore::new(backend.clone(), DEFAULT_SESSION_KEY)
            .persist(admin())
            .unwrap();

        let store = SessionStore::new(backend, DEFAULT_SESSION_KEY);
        assert_eq!(store.snapshot().role(), Some(Role::Admin));
    }

    #[test]
    fn test_pending_guard_rejects_second_attempt_and_releases_on_drop() {
        let store = SessionStore::in_memory();

        let first = store.begin_attempt().unwrap();
        assert!(store.is_pending());
        assert!(matches!(
            store.begin_attempt(),
            Err(AccessError::LoginAlreadyInProgress)
        ));

        drop(first);
        assert!(!store.is_pending());
        assert!(store.begin_attempt().is_ok());
        assert!(!store.is_pending());
    }

    #[test]
    fn test_completed_attempt_sets_identity_and_clears_pending() {
        let store = SessionStore::in_memory();
        let attempt = store.begin_attempt().unwrap();
        attempt.complete(admin()).unwrap();

        let session = store.snapshot();
        assert!(!session.pending);
        assert_eq!(session.identity, Some(admin()));
    }

    #[derive(Default)]
    struct SlowFirstRead {
        inner: MemoryStore,
        reads: AtomicUsize,
    }

    impl KeyValueStore for SlowFirstRead {
        fn get(&self, key: &str) -> AccessResult<Option<String>> {
            if self.reads.fetch_add(1, Ordering::SeqCst) == 0 {
                std::thread::sleep(Duration::from_millis(200));
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> AccessResult<()> {
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> AccessResult<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_persist_during_lazy_restore_is_kept() {
        let backend = Arc::new(SlowFirstRead::default());
        let store = Arc::new(SessionStore::new(backend.clone(), DEFAULT_SESSION_KEY));

        let reader = {
            let store = store.clone();
            std::thread::spawn(move || store.snapshot())
        };
        std::thread::sleep(Duration::from_millis(50));
        store.persist(admin()).unwrap();
        reader.join().unwrap();

        assert_eq!(store.current_identity(), Some(admin()));
        assert!(backend.get(DEFAULT_SESSION_KEY).unwrap().is_some());
    }

    #[test]
    fn test_keys_are_isolated() {
        let backend = shared_backend();
        SessionStore::new(backend.clone(), "tenant-a")
            .persist(admin())
            .unwrap();

        let other = SessionStore::open(backend, "tenant-b");
        assert_eq!(other.key(), "tenant-b");
        assert!(other.current_identity().is_none());
    }
}
