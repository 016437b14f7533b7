//! Volatile in-process medium.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::backend::StorageBackend;
use crate::error::Result;

/// In-process map whose lifetime equals the process.
///
/// Nothing is written anywhere; a restart starts from an empty store.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries, sorted by key.
    pub async fn entries(&self) -> Vec<(String, String)> {
        let data = self.data.read().await;
        let mut entries: Vec<_> = data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort();
        entries
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn is_durable(&self) -> bool {
        false
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.data
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.data.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<_> = self.data.read().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get("a").await.unwrap(), None);

        backend.set("a", "1").await.unwrap();
        backend.set("a", "2").await.unwrap();
        assert_eq!(backend.get("a").await.unwrap().as_deref(), Some("2"));
        assert_eq!(backend.len().await, 1);

        backend.remove("a").await.unwrap();
        assert!(backend.is_empty().await);

        // Removing twice is fine
        backend.remove("a").await.unwrap();
    }

    #[tokio::test]
    async fn keys_and_entries_are_sorted() {
        let backend = MemoryBackend::new();
        backend.set("b", "2").await.unwrap();
        backend.set("a", "1").await.unwrap();

        assert_eq!(backend.keys().await.unwrap(), vec!["a", "b"]);
        assert_eq!(
            backend.entries().await,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string())
            ]
        );
        assert!(!backend.is_durable());
    }
}
