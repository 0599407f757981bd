//! CareHub Access - Session, roles and route gating
//!
//! This crate decides who is signed in and what they may see:
//!
//! - **Session store** (`session`): the current identity, the pending flag of
//!   an in-flight login, and persistence of the identity across restarts
//! - **Authenticator** (`auth`): checks credentials against the identity
//!   directory and opens or closes the session
//! - **Role registry** (`auth::registry`): the static role → route table
//! - **Routing** (`routing`): protected/public guards, the home view
//!   dispatcher and the role-filtered navigation menu
//!
//! Views are out of scope; they consume the decisions made here.

pub mod auth;
pub mod routing;
pub mod session;

pub use auth::{
    Authenticator, DemoAccount, Identity, IdentityDirectory, IdentityProvider, Role, RoleProfile,
    RoleRegistry,
};
pub use routing::{
    GuardDecision, MenuItem, NavigationOutcome, NavigationShell, Navigator, ProtectedGuard,
    PublicGuard, RouteAccess, RouteDescriptor, RouteGuard, RouteId, RouteTable, ViewDispatcher,
    ViewId,
};
pub use session::{FileStore, KeyValueStore, MemoryStore, Session, SessionStore};

/// Access-layer error type
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("A login attempt is already in progress")]
    LoginAlreadyInProgress,

    #[error("Unknown role: {role}")]
    UnknownRole { role: String },

    #[error("Malformed persisted session: {message}")]
    MalformedPersistedSession { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Core error: {0}")]
    Core(#[from] carehub_core::CareHubError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type AccessResult<T> = Result<T, AccessError>;

impl AccessError {
    /// Create an unknown role error
    pub fn unknown_role<S: Into<String>>(role: S) -> Self {
        Self::UnknownRole { role: role.into() }
    }

    /// Create a malformed session error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedPersistedSession {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Whether the error may be shown to the end user.
    ///
    /// Only authentication outcomes qualify; persistence and parsing failures
    /// are handled internally.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AccessError::InvalidCredentials | AccessError::LoginAlreadyInProgress
        )
    }
}
