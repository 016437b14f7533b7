//! Configuration for the purchase session.

use std::path::Path;

use refill_storage::{KeyValueStore, StorageConfig};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};
use crate::reset::{ResetSignal, RESET_KEY_PREFIX};
use crate::session::{SessionStore, SELECTION_KEY};
use crate::types::DEFAULT_CURRENCY;

/// Purchase-session configuration. Every field is optional in the file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Storage medium and namespace.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Key of the single current-selection slot.
    #[serde(default = "default_selection_key")]
    pub selection_key: String,

    /// Prefix of per-product reset flags.
    #[serde(default = "default_reset_key_prefix")]
    pub reset_key_prefix: String,

    /// Currency for products that do not name one.
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

fn default_selection_key() -> String {
    SELECTION_KEY.to_string()
}

fn default_reset_key_prefix() -> String {
    RESET_KEY_PREFIX.to_string()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            selection_key: default_selection_key(),
            reset_key_prefix: default_reset_key_prefix(),
            default_currency: default_currency(),
        }
    }
}

impl SessionConfig {
    /// Load from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| SessionError::Config(format!("failed to read {}: {e}", path.display())))?;
        serde_json::from_str(&json).map_err(|e| SessionError::Config(e.to_string()))
    }

    /// Open storage and build the two persisted components on top of it.
    pub fn open(&self) -> Result<SessionHandles> {
        let store = self.storage.open()?;
        Ok(self.handles(store))
    }

    /// Build components over an already-open store.
    pub fn handles(&self, store: KeyValueStore) -> SessionHandles {
        SessionHandles {
            sessions: SessionStore::with_key(store.clone(), self.selection_key.clone()),
            resets: ResetSignal::with_prefix(store, self.reset_key_prefix.clone()),
            default_currency: self.default_currency.clone(),
        }
    }
}

/// Shared handles to the persisted session components.
///
/// Cheap to clone; both screens of a flow hold the same handles.
#[derive(Clone, Debug)]
pub struct SessionHandles {
    pub sessions: SessionStore,
    pub resets: ResetSignal,
    pub default_currency: String,
}

impl SessionHandles {
    /// Volatile handles with default keys.
    pub fn in_memory() -> Self {
        SessionConfig::default().handles(KeyValueStore::in_memory("dotrefill"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refill_storage::StorageMedium;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();

        let config = SessionConfig::from_file(file.path()).unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.selection_key, "product_selection");
        assert_eq!(config.reset_key_prefix, "reset:");
        assert_eq!(config.default_currency, "USD");
    }

    #[test]
    fn partial_file_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"storage": {{"medium": {{"type": "volatile"}}}}, "reset_key_prefix": "reset_terms_"}}"#
        )
        .unwrap();

        let config = SessionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.storage.medium, StorageMedium::Volatile);
        assert_eq!(config.reset_key_prefix, "reset_terms_");
    }

    #[test]
    fn missing_or_bad_file_is_config_error() {
        assert!(matches!(
            SessionConfig::from_file("/definitely/not/here.json"),
            Err(SessionError::Config(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            SessionConfig::from_file(file.path()),
            Err(SessionError::Config(_))
        ));
    }
}
