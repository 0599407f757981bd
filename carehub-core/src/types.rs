//! Configuration data types

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Top-level CareHub configuration, loaded from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CareHubConfig {
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Authentication settings for the mock identity directory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// The single secret every directory account accepts
    pub shared_secret: String,
    /// Simulated round-trip latency of a login attempt
    pub login_latency_ms: u64,
    /// Whether the four built-in demo accounts are loaded
    pub include_demo_accounts: bool,
    /// Additional accounts appended after the demo accounts
    pub accounts: Vec<AccountConfig>,
}

/// One directory account as written in the config file.
///
/// `role` is kept as a string here and checked when the directory is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountConfig {
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
}

/// Where the persisted session lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory backing the local key/value store
    pub data_dir: String,
    /// Namespaced key the signed-in identity is stored under
    pub session_key: String,
}
