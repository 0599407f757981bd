//! Configuration management

use crate::error::{CareHubError, CareHubResult, ErrorContext};
use crate::types::{AuthConfig, CareHubConfig, StorageConfig};
use crate::validation_error;

use std::collections::HashSet;
use std::path::Path;

/// Key under which the signed-in identity is persisted
pub const DEFAULT_SESSION_KEY: &str = "carehub.session_user";

/// Secret accepted by every demo account
pub const DEFAULT_SHARED_SECRET: &str = "demo";

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            shared_secret: DEFAULT_SHARED_SECRET.to_string(),
            login_latency_ms: 1000,
            include_demo_accounts: true,
            accounts: Vec::new(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.carehub/data".to_string(),
            session_key: DEFAULT_SESSION_KEY.to_string(),
        }
    }
}

impl CareHubConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> CareHubResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CareHubError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_metadata("path", &path.display().to_string())
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> CareHubResult<Self> {
        toml::from_str(content).map_err(|e| CareHubError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> CareHubResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| CareHubError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content).map_err(|e| CareHubError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration.
    ///
    /// Role names of extra accounts are not checked here; the identity
    /// directory rejects unknown roles when it is built.
    pub fn validate(&self) -> CareHubResult<()> {
        if self.auth.shared_secret.is_empty() {
            return Err(validation_error!(
                "Shared secret must not be empty",
                "auth.shared_secret",
                "config"
            ));
        }

        if self.storage.session_key.is_empty() {
            return Err(validation_error!(
                "Session key must not be empty",
                "storage.session_key",
                "config"
            ));
        }

        if !self
            .storage
            .session_key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(validation_error!(
                format!(
                    "Session key '{}' may only contain letters, digits, '.', '_' and '-'",
                    self.storage.session_key
                ),
                "storage.session_key",
                "config"
            ));
        }

        let mut seen = HashSet::new();
        for account in &self.auth.accounts {
            if account.email.is_empty() {
                return Err(validation_error!(
                    format!("Account '{}' has an empty email", account.id),
                    "auth.accounts.email",
                    "config"
                ));
            }
            if !seen.insert(account.email.as_str()) {
                return Err(validation_error!(
                    format!("Duplicate account email: {}", account.email),
                    "auth.accounts.email",
                    "config"
                ));
            }
        }

        Ok(())
    }
}
