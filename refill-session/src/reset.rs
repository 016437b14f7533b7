//! One-shot "user backed out of payment" flag, keyed by product.
//!
//! The payment screen raises the flag; the product screen consumes it on its
//! next mount or focus. Consuming deletes the flag, so one raise is observed
//! by at most one consume.

use std::sync::Arc;

use refill_storage::KeyValueStore;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::types::ProductId;

/// Default key prefix; flags live at `reset:{product_id}`.
pub const RESET_KEY_PREFIX: &str = "reset:";

const RAISED: &str = "true";

/// Storage-backed outbox of per-product reset flags.
#[derive(Clone, Debug)]
pub struct ResetSignal {
    store: KeyValueStore,
    prefix: String,
    /// Serializes read-then-delete so clones never double-consume.
    consume_lock: Arc<Mutex<()>>,
}

impl ResetSignal {
    pub fn new(store: KeyValueStore) -> Self {
        Self::with_prefix(store, RESET_KEY_PREFIX)
    }

    pub fn with_prefix(store: KeyValueStore, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            consume_lock: Arc::new(Mutex::new(())),
        }
    }

    fn key(&self, product_id: &ProductId) -> String {
        format!("{}{}", self.prefix, product_id)
    }

    /// Mark `product_id` for a terms reset.
    pub async fn raise(&self, product_id: &ProductId) {
        debug!(product_id = %product_id, "Raising reset flag");
        self.store.set(&self.key(product_id), RAISED).await;
    }

    /// Observe and clear the flag. `true` at most once per raise.
    ///
    /// Presence of the key is what counts, not its value. A flag that could
    /// not be deleted is reported as not raised and left for a later consume.
    pub async fn consume(&self, product_id: &ProductId) -> bool {
        let _guard = self.consume_lock.lock().await;
        let key = self.key(product_id);

        if self.store.get(&key).await.is_none() {
            return false;
        }

        if !self.store.delete(&key).await {
            warn!(product_id = %product_id, "Reset flag could not be cleared, leaving it pending");
            return false;
        }

        info!(product_id = %product_id, "Resetting terms for product");
        true
    }

    /// Products that currently have a pending flag.
    pub async fn pending(&self) -> Vec<ProductId> {
        self.store
            .keys()
            .await
            .into_iter()
            .filter_map(|k| k.strip_prefix(&self.prefix).map(ProductId::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use refill_storage::{MemoryBackend, StorageBackend, StorageError};

    /// Reads and writes work, removals fail until `heal` is set.
    struct StuckRemovals {
        inner: MemoryBackend,
        heal: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl StorageBackend for StuckRemovals {
        fn name(&self) -> &'static str {
            "stuck"
        }

        fn is_durable(&self) -> bool {
            false
        }

        async fn get(&self, key: &str) -> refill_storage::Result<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> refill_storage::Result<()> {
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> refill_storage::Result<()> {
            if self.heal.load(std::sync::atomic::Ordering::SeqCst) {
                self.inner.remove(key).await
            } else {
                Err(StorageError::Backend("read-only medium".into()))
            }
        }

        async fn keys(&self) -> refill_storage::Result<Vec<String>> {
            self.inner.keys().await
        }
    }

    #[tokio::test]
    async fn raise_is_consumed_exactly_once() {
        let signal = ResetSignal::new(KeyValueStore::in_memory("t"));
        let amazon = ProductId::new("amazon");

        assert!(!signal.consume(&amazon).await);
        signal.raise(&amazon).await;
        assert!(signal.consume(&amazon).await);
        assert!(!signal.consume(&amazon).await);
    }

    #[tokio::test]
    async fn flags_are_per_product() {
        let signal = ResetSignal::new(KeyValueStore::in_memory("t"));
        let amazon = ProductId::new("amazon");
        let steam = ProductId::new("steam");

        signal.raise(&amazon).await;
        assert!(!signal.consume(&steam).await);
        assert_eq!(signal.pending().await, vec![amazon.clone()]);
        assert!(signal.consume(&amazon).await);
        assert!(signal.pending().await.is_empty());
    }

    #[tokio::test]
    async fn double_raise_still_yields_one_observation() {
        let signal = ResetSignal::new(KeyValueStore::in_memory("t"));
        let amazon = ProductId::new("amazon");

        signal.raise(&amazon).await;
        signal.raise(&amazon).await;
        assert!(signal.consume(&amazon).await);
        assert!(!signal.consume(&amazon).await);
    }

    #[tokio::test]
    async fn concurrent_consumers_share_one_flag() {
        let signal = ResetSignal::new(KeyValueStore::in_memory("t"));
        let amazon = ProductId::new("amazon");
        signal.raise(&amazon).await;

        let a = signal.clone();
        let b = signal.clone();
        let (id_a, id_b) = (amazon.clone(), amazon.clone());
        let (ra, rb) = tokio::join!(
            async move { a.consume(&id_a).await },
            async move { b.consume(&id_b).await }
        );
        assert!(ra ^ rb);
    }

    #[tokio::test]
    async fn legacy_prefix_is_supported() {
        let store = KeyValueStore::in_memory("");
        let signal = ResetSignal::with_prefix(store.clone(), "reset_terms_");
        let amazon = ProductId::new("amazon");

        store.set("reset_terms_amazon", "true").await;
        assert!(signal.consume(&amazon).await);
        assert_eq!(store.get("reset_terms_amazon").await, None);
    }

    #[tokio::test]
    async fn undeletable_flag_is_not_observed_twice() {
        let backend = Arc::new(StuckRemovals {
            inner: MemoryBackend::new(),
            heal: std::sync::atomic::AtomicBool::new(false),
        });
        let signal = ResetSignal::new(KeyValueStore::new(backend.clone(), "t"));
        let amazon = ProductId::new("amazon");

        signal.raise(&amazon).await;
        assert!(!signal.consume(&amazon).await);
        assert!(!signal.consume(&amazon).await);
        assert_eq!(signal.pending().await, vec![amazon.clone()]);

        backend.heal.store(true, std::sync::atomic::Ordering::SeqCst);
        assert!(signal.consume(&amazon).await);
        assert!(!signal.consume(&amazon).await);
    }
}
