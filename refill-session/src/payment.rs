//! Payment confirmation screen controller.
//!
//! The payment screen is reached through a [`NavigationIntent`]. Backing out
//! raises the product's reset flag so the product screen drops terms
//! acceptance on its next mount or focus. Paying is handed to an external
//! wallet integration.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;
use crate::reset::ResetSignal;
use crate::types::{NavigationIntent, ProductId};

/// The wallet side of a payment. Implemented outside this crate.
#[async_trait]
pub trait PaymentHandler: Send + Sync {
    async fn pay(&self, intent: &NavigationIntent);
}

/// Result of [`PaymentScreen::pay`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayOutcome {
    /// Handed to the configured payment handler.
    Submitted,
    /// No handler configured; nothing was sent.
    Pending,
}

/// Result of [`PaymentScreen::back`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackNavigation {
    pub product_id: ProductId,
    /// Whether a reset flag was raised for the product.
    pub reset_raised: bool,
}

pub struct PaymentScreen {
    intent: NavigationIntent,
    resets: ResetSignal,
    handler: Option<Arc<dyn PaymentHandler>>,
}

impl PaymentScreen {
    pub fn new(intent: NavigationIntent, resets: ResetSignal) -> Self {
        Self {
            intent,
            resets,
            handler: None,
        }
    }

    /// Build from route parameters as produced by [`NavigationIntent::to_params`].
    pub fn from_params(params: &BTreeMap<String, String>, resets: ResetSignal) -> Result<Self> {
        Ok(Self::new(NavigationIntent::from_params(params)?, resets))
    }

    pub fn with_handler(mut self, handler: Arc<dyn PaymentHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn intent(&self) -> &NavigationIntent {
        &self.intent
    }

    /// Leave without paying. The flag is raised before returning.
    pub async fn back(&self) -> BackNavigation {
        let product_id = self.intent.product_id.clone();
        let reset_raised = !product_id.is_empty();
        if reset_raised {
            self.resets.raise(&product_id).await;
        }

        BackNavigation {
            product_id,
            reset_raised,
        }
    }

    pub async fn pay(&self) -> PayOutcome {
        match &self.handler {
            Some(handler) => {
                handler.pay(&self.intent).await;
                PayOutcome::Submitted
            }
            None => {
                info!(product_id = %self.intent.product_id, "Processing payment...");
                PayOutcome::Pending
            }
        }
    }
}

impl fmt::Debug for PaymentScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentScreen")
            .field("intent", &self.intent)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Amount;
    use refill_storage::KeyValueStore;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingHandler {
        paid: Mutex<Vec<NavigationIntent>>,
    }

    #[async_trait]
    impl PaymentHandler for RecordingHandler {
        async fn pay(&self, intent: &NavigationIntent) {
            self.paid.lock().await.push(intent.clone());
        }
    }

    fn intent(product_id: &str) -> NavigationIntent {
        NavigationIntent {
            product_id: ProductId::new(product_id),
            product_name: "Amazon Gift Card".into(),
            amount: Amount::new(25.0).unwrap(),
            currency: "USD".into(),
        }
    }

    #[tokio::test]
    async fn back_raises_reset_flag() {
        let resets = ResetSignal::new(KeyValueStore::in_memory("t"));
        let screen = PaymentScreen::new(intent("amazon"), resets.clone());

        let back = screen.back().await;
        assert!(back.reset_raised);
        assert!(resets.consume(&ProductId::new("amazon")).await);
    }

    #[tokio::test]
    async fn back_without_product_raises_nothing() {
        let resets = ResetSignal::new(KeyValueStore::in_memory("t"));
        let screen = PaymentScreen::new(intent(""), resets.clone());

        assert!(!screen.back().await.reset_raised);
        assert!(resets.pending().await.is_empty());
    }

    #[tokio::test]
    async fn pay_delegates_to_handler() {
        let resets = ResetSignal::new(KeyValueStore::in_memory("t"));
        assert_eq!(
            PaymentScreen::new(intent("amazon"), resets.clone()).pay().await,
            PayOutcome::Pending
        );

        let handler = Arc::new(RecordingHandler::default());
        let screen = PaymentScreen::new(intent("amazon"), resets).with_handler(handler.clone());
        assert_eq!(screen.pay().await, PayOutcome::Submitted);
        assert_eq!(handler.paid.lock().await.as_slice(), &[intent("amazon")]);
    }

    #[tokio::test]
    async fn from_params_round_trips_intent() {
        let resets = ResetSignal::new(KeyValueStore::in_memory("t"));
        let screen = PaymentScreen::from_params(&intent("amazon").to_params(), resets).unwrap();
        assert_eq!(screen.intent(), &intent("amazon"));
    }
}
