//! Credential storage backends.
//!
//! The file backend writes a versioned JSON document with secure file
//! permissions (0o600). A missing, unreadable, or unrecognized file loads
//! as an empty store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::errors::AuthError;

/// Pluggable key/value storage for credentials.
///
/// Implementations must be safe to share across the coordinator and any
/// background tasks. Write failures are surfaced so callers can decide
/// whether persistence loss is fatal.
pub trait CredentialStore: Send + Sync {
    /// Read a value by key.
    fn get(&self, key: &str) -> Option<String>;
    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), AuthError>;
    /// Remove a value. Removing a missing key is a no-op.
    fn remove(&self, key: &str) -> Result<(), AuthError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory store
// ─────────────────────────────────────────────────────────────────────────────

/// Volatile store for tests and short-lived clients.
#[derive(Default)]
pub struct MemoryCredentialStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AuthError> {
        let _ = self
            .values
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        let _ = self.values.write().remove(key);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File-backed store
// ─────────────────────────────────────────────────────────────────────────────

/// On-disk document format.
#[derive(Debug, Serialize, Deserialize)]
struct StoredDocument {
    version: u32,
    values: HashMap<String, String>,
    #[serde(rename = "lastUpdated")]
    last_updated: String,
}

impl Default for StoredDocument {
    fn default() -> Self {
        Self {
            version: 1,
            values: HashMap::new(),
            last_updated: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Persistent store backed by a single JSON file.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store reading and writing the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document, falling back to empty on any problem.
    fn load(&self) -> StoredDocument {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return StoredDocument::default();
            }
            Err(e) => {
                tracing::warn!("failed to read credential file: {e}");
                return StoredDocument::default();
            }
        };

        match serde_json::from_str::<StoredDocument>(&data) {
            Ok(doc) if doc.version == 1 => doc,
            Ok(doc) => {
                tracing::warn!("unsupported credential file version: {}", doc.version);
                StoredDocument::default()
            }
            Err(e) => {
                tracing::warn!("failed to parse credential file: {e}");
                StoredDocument::default()
            }
        }
    }

    /// Save the document. Creates parent directories if needed and sets
    /// file permissions to 0o600.
    fn save(&self, doc: &mut StoredDocument) -> Result<(), AuthError> {
        doc.last_updated = chrono::Utc::now().to_rfc3339();

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(doc)?;
        std::fs::write(&self.path, &json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&self.path, perms);
        }

        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.load().values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AuthError> {
        let mut doc = self.load();
        let _ = doc.values.insert(key.to_string(), value.to_string());
        self.save(&mut doc)
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        let mut doc = self.load();
        if doc.values.remove(key).is_none() {
            return Ok(());
        }
        self.save(&mut doc)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
