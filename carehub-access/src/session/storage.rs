//! Session Storage - Local persistence for the signed-in identity
//!
//! A small key/value abstraction over "local storage" plus the versioned
//! record format the session store writes into it.

use crate::auth::{Identity, IdentityRecord};
use crate::{AccessError, AccessResult};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Current layout version of the persisted session record
pub const SESSION_FORMAT_VERSION: u32 = 1;

/// String key/value storage, the equivalent of browser local storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> AccessResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> AccessResult<()>;
    fn remove(&self, key: &str) -> AccessResult<()>;
}

/// Volatile store, used by tests and throwaway sessions
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> AccessResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AccessResult<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AccessResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per key
pub struct FileStore {
    storage_dir: PathBuf,
}

impl FileStore {
    /// Create the store, creating the directory if needed
    pub fn new<P: AsRef<Path>>(storage_dir: P) -> AccessResult<Self> {
        let storage_dir = storage_dir.as_ref().to_path_buf();

        std::fs::create_dir_all(&storage_dir)?;

        info!("Session storage initialized at: {}", storage_dir.display());

        Ok(Self { storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    fn path_for(&self, key: &str) -> AccessResult<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
            return Err(AccessError::storage(format!("Invalid storage key: {key}")));
        }
        Ok(self.storage_dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> AccessResult<Option<String>> {
        let path = self.path_for(key)?;

        match std::fs::read(&path) {
            Ok(bytes) => {
                debug!("Read {} from {}", key, path.display());
                let value =
                    String::from_utf8(bytes).map_err(|e| AccessError::malformed(e.to_string()))?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> AccessResult<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");

        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;

        debug!("Wrote {} to {}", key, path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> AccessResult<()> {
        let path = self.path_for(key)?;

        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// On-disk layout of a persisted session
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedSession {
    version: u32,
    saved_at: chrono::DateTime<chrono::Utc>,
    identity: IdentityRecord,
}

pub(crate) fn encode_session(identity: &Identity) -> AccessResult<String> {
    let record = PersistedSession {
        version: SESSION_FORMAT_VERSION,
        saved_at: chrono::Utc::now(),
        identity: IdentityRecord::from(identity.clone()),
    };
    Ok(serde_json::to_string(&record)?)
}

/// Decode a stored record.
///
/// Fails with `MalformedPersistedSession` for unparseable data or an
/// unsupported version, and with `UnknownRole` for a role outside the
/// closed set.
pub(crate) fn decode_session(raw: &str) -> AccessResult<Identity> {
    let record: PersistedSession =
        serde_json::from_str(raw).map_err(|e| AccessError::malformed(e.to_string()))?;

    if record.version != SESSION_FORMAT_VERSION {
        return Err(AccessError::malformed(format!(
            "unsupported session version {}",
            record.version
        )));
    }

    Identity::try_from(record.identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::RoleProfile;

    fn caregiver() -> Identity {
        Identity::new(
            "3",
            "Ana Costa",
            "ana@healthcare.com",
            RoleProfile::Caregiver {
                license: "CRE-12345".to_string(),
            },
        )
    }

    #[test]
    fn test_record_carries_version() {
        let raw = encode_session(&caregiver()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], SESSION_FORMAT_VERSION);
        assert_eq!(value["identity"]["license"], "CRE-12345");
        assert_eq!(decode_session(&raw).unwrap(), caregiver());
    }

    #[test]
    fn test_future_version_is_malformed() {
        let raw = encode_session(&caregiver())
            .unwrap()
            .replace("\"version\":1", "\"version\":7");
        assert!(matches!(
            decode_session(&raw),
            Err(AccessError::MalformedPersistedSession { .. })
        ));
    }

    #[test]
    fn test_unversioned_user_blob_is_malformed() {
        let raw = r#"{"id":"1","name":"Dr. Maria Silva","email":"maria@healthcare.com","role":"admin"}"#;
        assert!(matches!(
            decode_session(raw),
            Err(AccessError::MalformedPersistedSession { .. })
        ));
    }

    #[test]
    fn test_forged_role_is_unknown_role() {
        let raw = encode_session(&caregiver())
            .unwrap()
            .replace("\"caregiver\"", "\"superuser\"");
        assert!(matches!(
            decode_session(&raw),
            Err(AccessError::UnknownRole { .. })
        ));
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_file_store_writes_one_file_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("data")).unwrap();

        store.set("carehub.session_user", "{}").unwrap();
        assert!(store.storage_dir().join("carehub.session_user.json").exists());
        assert_eq!(
            store.get("carehub.session_user").unwrap().as_deref(),
            Some("{}")
        );

        store.remove("carehub.session_user").unwrap();
        assert_eq!(store.get("carehub.session_user").unwrap(), None);
        store.remove("carehub.session_user").unwrap();
    }

    #[test]
    fn test_file_store_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        std::fs::write(dir.path().join("k.json"), [b'{', 0xFF, b'}']).unwrap();

        assert!(matches!(
            store.get("k"),
            Err(AccessError::MalformedPersistedSession { .. })
        ));
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        assert!(matches!(
            store.set("../outside", "x"),
            Err(AccessError::Storage { .. })
        ));
    }
}
