//! The storage medium abstraction.

use async_trait::async_trait;

use crate::error::Result;

/// A key-value medium holding string values.
///
/// Implementations report failures; they are not expected to hide them.
/// Keys passed here are already namespaced by [`crate::KeyValueStore`].
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Human-readable medium name, used in logs.
    fn name(&self) -> &'static str;

    /// Whether values survive a process restart.
    fn is_durable(&self) -> bool;

    /// Read a value. `Ok(None)` means the key is not present.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// List every key currently stored.
    async fn keys(&self) -> Result<Vec<String>>;
}
