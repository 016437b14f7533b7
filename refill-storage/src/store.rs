//! Lossy, namespaced store facade.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::backend::StorageBackend;
use crate::memory::MemoryBackend;

// ═══════════════════════════════════════════════════════════════════════════════
// KEY-VALUE STORE
// ═══════════════════════════════════════════════════════════════════════════════

/// Async get/set/delete over a [`StorageBackend`], scoped to a namespace.
///
/// The store never fails. Backend errors are logged and surface as an
/// absent value (reads) or a no-op (writes), so callers treat "not found" and
/// "failed to read" identically. There is no retry; the next read or write is
/// a fresh attempt.
///
/// Cloning is cheap and clones share the same backend.
#[derive(Clone)]
pub struct KeyValueStore {
    backend: Arc<dyn StorageBackend>,
    namespace: String,
}

impl KeyValueStore {
    /// Wrap a backend. An empty namespace leaves keys unprefixed.
    pub fn new(backend: Arc<dyn StorageBackend>, namespace: impl Into<String>) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
        }
    }

    /// A fresh volatile store, mostly useful in tests.
    pub fn in_memory(namespace: impl Into<String>) -> Self {
        Self::new(Arc::new(MemoryBackend::new()), namespace)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Whether the underlying medium survives restarts.
    pub fn is_durable(&self) -> bool {
        self.backend.is_durable()
    }

    /// A store sharing this backend under a different namespace.
    pub fn scoped(&self, namespace: impl Into<String>) -> Self {
        Self::new(Arc::clone(&self.backend), namespace)
    }

    fn full_key(&self, key: &str) -> String {
        if self.namespace.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.namespace, key)
        }
    }

    /// Read a value; `None` when absent or when the read failed.
    pub async fn get(&self, key: &str) -> Option<String> {
        let full_key = self.full_key(key);
        match self.backend.get(&full_key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    backend = self.backend.name(),
                    key = %full_key,
                    code = e.error_code(),
                    "Error getting item: {}",
                    e
                );
                None
            }
        }
    }

    /// Write a value; failures are logged and dropped.
    pub async fn set(&self, key: &str, value: &str) {
        let full_key = self.full_key(key);
        if let Err(e) = self.backend.set(&full_key, value).await {
            warn!(
                backend = self.backend.name(),
                key = %full_key,
                code = e.error_code(),
                "Error setting item: {}",
                e
            );
        }
    }

    /// Remove a value; failures are logged and dropped.
    ///
    /// Returns `false` when the backend reported an error, so callers that
    /// need the removal to stick can tell.
    pub async fn delete(&self, key: &str) -> bool {
        let full_key = self.full_key(key);
        match self.backend.remove(&full_key).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    backend = self.backend.name(),
                    key = %full_key,
                    code = e.error_code(),
                    "Error removing item: {}",
                    e
                );
                false
            }
        }
    }

    /// Read and decode a JSON value. Undecodable values count as absent.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(
                    backend = self.backend.name(),
                    key = %self.full_key(key),
                    "Discarding undecodable value: {}",
                    e
                );
                None
            }
        }
    }

    /// Encode a value as JSON and write it.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, &raw).await,
            Err(e) => warn!(
                backend = self.backend.name(),
                key = %self.full_key(key),
                "Error encoding item: {}",
                e
            ),
        }
    }

    /// Keys in this namespace, prefix stripped. Empty if listing failed.
    pub async fn keys(&self) -> Vec<String> {
        let keys = match self.backend.keys().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(backend = self.backend.name(), "Error listing keys: {}", e);
                return Vec::new();
            }
        };

        if self.namespace.is_empty() {
            return keys;
        }

        let prefix = format!("{}:", self.namespace);
        keys.into_iter()
            .filter_map(|k| k.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }
}

impl fmt::Debug for KeyValueStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyValueStore")
            .field("backend", &self.backend.name())
            .field("namespace", &self.namespace)
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
