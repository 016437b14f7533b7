//! Saved amount selection.
//!
//! A single well-known key holds at most one [`SelectionRecord`]. Every save
//! overwrites it regardless of product, and loads filter by product id: a
//! record for another product reads as "no selection" but stays in storage
//! until the next save.

use refill_storage::KeyValueStore;
use tracing::debug;

use crate::types::{Amount, ProductId, SelectionRecord};

/// Storage key of the current-selection slot.
pub const SELECTION_KEY: &str = "product_selection";

/// Persists the user's in-progress amount pick.
#[derive(Clone, Debug)]
pub struct SessionStore {
    store: KeyValueStore,
    key: String,
}

impl SessionStore {
    pub fn new(store: KeyValueStore) -> Self {
        Self::with_key(store, SELECTION_KEY)
    }

    /// Use a non-default slot key.
    pub fn with_key(store: KeyValueStore, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Overwrite the slot with `(product_id, amount)` stamped now.
    ///
    /// Never fails observably; a storage failure is logged by the store.
    pub async fn save(&self, product_id: &ProductId, amount: Amount) {
        let record = SelectionRecord::now(product_id.clone(), amount);
        debug!(product_id = %product_id, amount = %amount, "Saving selection");
        self.store.set_json(&self.key, &record).await;
    }

    /// The saved amount, if the slot holds a record for `product_id`.
    ///
    /// Does not touch storage beyond a single read.
    pub async fn load(&self, product_id: &ProductId) -> Option<Amount> {
        self.current()
            .await
            .filter(|record| &record.product_id == product_id)
            .map(|record| record.amount)
    }

    /// The raw record in the slot, whichever product it belongs to.
    pub async fn current(&self) -> Option<SelectionRecord> {
        self.store.get_json(&self.key).await
    }
}
