//! Storage configuration.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backend::StorageBackend;
use crate::error::Result;
use crate::memory::MemoryBackend;
use crate::store::KeyValueStore;

/// Which medium backs the store and how keys are scoped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backing medium.
    #[serde(default)]
    pub medium: StorageMedium,

    /// Key namespace; every key is stored as `{namespace}:{key}`.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_namespace() -> String {
    "dotrefill".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            medium: StorageMedium::default(),
            namespace: default_namespace(),
        }
    }
}

impl StorageConfig {
    /// Volatile storage, e.g. for tests or `--volatile` runs.
    pub fn volatile() -> Self {
        Self {
            medium: StorageMedium::Volatile,
            ..Self::default()
        }
    }

    /// Durable storage at `path`.
    pub fn durable(path: impl Into<PathBuf>) -> Self {
        Self {
            medium: StorageMedium::Durable { path: path.into() },
            ..Self::default()
        }
    }

    /// Open the configured medium.
    ///
    /// This is the only fallible step: once a store is open, its operations
    /// never fail.
    pub fn open(&self) -> Result<KeyValueStore> {
        let backend: Arc<dyn StorageBackend> = match &self.medium {
            StorageMedium::Volatile => Arc::new(MemoryBackend::new()),
            #[cfg(feature = "sqlite")]
            StorageMedium::Durable { path } => Arc::new(crate::sqlite::SqliteBackend::open(path)?),
            #[cfg(not(feature = "sqlite"))]
            StorageMedium::Durable { path } => {
                tracing::warn!(
                    "Durable storage at {:?} requires the `sqlite` feature, using memory",
                    path
                );
                Arc::new(MemoryBackend::new())
            }
        };

        Ok(KeyValueStore::new(backend, self.namespace.clone()))
    }
}

/// Storage medium selection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageMedium {
    /// In-process map, cleared on restart.
    Volatile,
    /// SQLite file that survives restarts.
    Durable {
        #[serde(default = "default_store_path")]
        path: PathBuf,
    },
}

impl Default for StorageMedium {
    fn default() -> Self {
        StorageMedium::Durable {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dotrefill")
        .join("session.sqlite3")
}
