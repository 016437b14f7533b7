//! Product screen controller.
//!
//! Wires one product's [`PurchaseGate`] to the persisted session: restores
//! the saved amount and applies pending reset flags on mount and focus,
//! saves every amount pick, and hands out navigation intents.
//!
//! A refresh runs in two halves so a caller can await storage without
//! holding the screen: [`ProductScreen::refresh`] returns a detached future,
//! [`ProductScreen::apply`] folds its result in. Results issued before the
//! latest mount/unmount are discarded except for a consumed reset, and a
//! saved amount is not restored over a pick the user made while the refresh
//! was in flight. Every mount starts with terms unaccepted.

use std::future::Future;

use tracing::debug;

use crate::catalog::{Catalog, Product};
use crate::config::SessionHandles;
use crate::error::{Result, SessionError};
use crate::gate::{GateProduct, GateState, PurchaseGate, ToggleOutcome};
use crate::reset::ResetSignal;
use crate::session::SessionStore;
use crate::types::{Amount, ProductId};

/// What triggered a refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshTrigger {
    Mount,
    Focus,
}

/// Storage reads for one refresh, not yet applied to the gate.
#[derive(Clone, Debug)]
pub struct Refresh {
    trigger: RefreshTrigger,
    epoch: u64,
    picks: u64,
    saved_amount: Option<Amount>,
    reset_raised: bool,
}

/// What a refresh changed.
#[derive(Clone, Debug, PartialEq)]
pub struct RefreshReport {
    pub trigger: RefreshTrigger,
    /// `false` when the result arrived for a stale mount and was dropped.
    pub applied: bool,
    pub restored_amount: Option<Amount>,
    pub terms_reset: bool,
}

/// Controller for a single product's detail screen.
#[derive(Debug)]
pub struct ProductScreen {
    product: Product,
    gate: PurchaseGate,
    sessions: SessionStore,
    resets: ResetSignal,
    mounted: bool,
    /// Bumped on mount and unmount.
    epoch: u64,
    /// Bumped on every user amount pick.
    picks: u64,
}

impl ProductScreen {
    /// Open the screen for `product_id`; unknown ids are rejected.
    pub fn open(catalog: &Catalog, product_id: &ProductId, handles: &SessionHandles) -> Result<Self> {
        let product = catalog.require(product_id)?.clone();
        let gate = PurchaseGate::new(GateProduct::from_product(&product, &handles.default_currency));

        Ok(Self {
            product,
            gate,
            sessions: handles.sessions.clone(),
            resets: handles.resets.clone(),
            mounted: false,
            epoch: 0,
            picks: 0,
        })
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product.id
    }

    pub fn gate(&self) -> &PurchaseGate {
        &self.gate
    }

    pub fn state(&self) -> GateState {
        self.gate.state()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Mount: restore the saved amount and apply any pending reset.
    ///
    /// A mount starts with terms unaccepted. Both reads complete before this
    /// returns.
    pub async fn mount(&mut self) -> RefreshReport {
        self.mounted = true;
        self.epoch += 1;
        self.gate.reset_from_signal();
        let refresh = self.refresh(RefreshTrigger::Mount).await;
        self.apply(refresh)
    }

    /// Regain focus. Focusing an unmounted screen mounts it.
    pub async fn focus(&mut self) -> RefreshReport {
        if !self.mounted {
            return self.mount().await;
        }
        let refresh = self.refresh(RefreshTrigger::Focus).await;
        self.apply(refresh)
    }

    /// Leave the screen; in-flight refreshes become stale.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.epoch += 1;
    }

    /// Read the saved selection and consume the reset flag concurrently.
    ///
    /// The returned future does not borrow the screen.
    pub fn refresh(&self, trigger: RefreshTrigger) -> impl Future<Output = Refresh> + Send + 'static {
        let sessions = self.sessions.clone();
        let resets = self.resets.clone();
        let product_id = self.product.id.clone();
        let epoch = self.epoch;
        let picks = self.picks;

        async move {
            let (saved_amount, reset_raised) =
                tokio::join!(sessions.load(&product_id), resets.consume(&product_id));
            Refresh {
                trigger,
                epoch,
                picks,
                saved_amount,
                reset_raised,
            }
        }
    }

    /// Fold a refresh into the gate unless it is stale.
    ///
    /// The reset flag was already consumed by the refresh, so a raised flag
    /// clears acceptance even when the rest of a stale result is dropped.
    pub fn apply(&mut self, refresh: Refresh) -> RefreshReport {
        let mut report = RefreshReport {
            trigger: refresh.trigger,
            applied: false,
            restored_amount: None,
            terms_reset: false,
        };

        if refresh.reset_raised {
            self.gate.reset_from_signal();
            report.terms_reset = true;
        }

        if refresh.epoch != self.epoch || !self.mounted {
            debug!(
                product_id = %self.product.id,
                reset_raised = refresh.reset_raised,
                "Discarding stale refresh"
            );
            return report;
        }
        report.applied = true;

        if let Some(amount) = refresh.saved_amount {
            if refresh.picks == self.picks {
                self.gate.select_amount(amount);
                report.restored_amount = Some(amount);
            }
        }

        report
    }

    /// Pick an amount: validate, update the gate, persist.
    pub async fn select_amount(&mut self, amount: f64) -> Result<Amount> {
        let amount = Amount::new(amount)?;
        if !self.product.offers(amount) {
            return Err(SessionError::AmountNotOffered {
                product_id: self.product.id.to_string(),
                amount: amount.value(),
            });
        }

        self.picks += 1;
        self.gate.select_amount(amount);
        self.sessions.save(&self.product.id, amount).await;
        Ok(amount)
    }

    /// Flip terms acceptance; an `Accepted` outcome carries the intent.
    pub fn toggle_terms(&mut self) -> ToggleOutcome {
        self.gate.toggle_terms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NavigationIntent;

    fn catalog() -> Catalog {
        Catalog::from_json_str(
            r#"{
                "amazon": {"name": "Amazon", "title": "Amazon Gift Card", "amounts": [25, 50, 100], "currency": "USD"},
                "steam": {"name": "Steam", "amounts": [20, 50]}
            }"#,
        )
        .unwrap()
    }

    fn amount(v: f64) -> Amount {
        Amount::new(v).unwrap()
    }

    #[test]
    fn unknown_product_is_rejected() {
        let handles = SessionHandles::in_memory();
        let err = ProductScreen::open(&catalog(), &ProductId::new("nope"), &handles).unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_PRODUCT");
    }

    #[tokio::test]
    async fn select_validates_and_persists() {
        let handles = SessionHandles::in_memory();
        let mut screen = ProductScreen::open(&catalog(), &ProductId::new("amazon"), &handles).unwrap();
        screen.mount().await;

        assert!(matches!(
            screen.select_amount(30.0).await,
            Err(SessionError::AmountNotOffered { .. })
        ));
        assert_eq!(screen.state().selected_amount, None);

        screen.select_amount(50.0).await.unwrap();
        assert_eq!(
            handles.sessions.load(&ProductId::new("amazon")).await,
            Some(amount(50.0))
        );
    }

    #[tokio::test]
    async fn mount_restores_saved_amount() {
        let handles = SessionHandles::in_memory();
        handles.sessions.save(&ProductId::new("amazon"), amount(100.0)).await;

        let mut screen = ProductScreen::open(&catalog(), &ProductId::new("amazon"), &handles).unwrap();
        let report = screen.mount().await;

        assert!(report.applied);
        assert_eq!(report.restored_amount, Some(amount(100.0)));
        assert!(!report.terms_reset);
        assert_eq!(screen.state().selected_amount, Some(amount(100.0)));
    }

    #[tokio::test]
    async fn intent_uses_title_and_default_currency() {
        let handles = SessionHandles::in_memory();
        let mut screen = ProductScreen::open(&catalog(), &ProductId::new("steam"), &handles).unwrap();
        screen.mount().await;
        screen.select_amount(20.0).await.unwrap();

        let outcome = screen.toggle_terms();
        assert_eq!(
            outcome.intent(),
            Some(&NavigationIntent {
                product_id: ProductId::new("steam"),
                product_name: "Steam".into(),
                amount: amount(20.0),
                currency: "USD".into(),
            })
        );
    }

    #[tokio::test]
    async fn refresh_after_unmount_is_discarded() {
        let handles = SessionHandles::in_memory();
        let amazon = ProductId::new("amazon");
        let mut screen = ProductScreen::open(&catalog(), &amazon, &handles).unwrap();
        screen.mount().await;
        screen.select_amount(25.0).await.unwrap();
        screen.toggle_terms();

        let pending = screen.refresh(RefreshTrigger::Focus);
        screen.unmount();

        let report = screen.apply(pending.await);
        assert!(!report.applied);
        assert!(!report.terms_reset);
        assert!(screen.state().terms_accepted);
        assert_eq!(screen.state().selected_amount, Some(amount(25.0)));
    }

    #[tokio::test]
    async fn back_out_during_stale_refresh_still_clears_terms() {
        let handles = SessionHandles::in_memory();
        let amazon = ProductId::new("amazon");
        let mut screen = ProductScreen::open(&catalog(), &amazon, &handles).unwrap();
        screen.mount().await;
        screen.select_amount(25.0).await.unwrap();
        assert!(screen.toggle_terms().intent().is_some());

        // Refresh issued, then the user leaves and backs out of payment
        // before the refresh resolves.
        let pending = screen.refresh(RefreshTrigger::Focus);
        screen.unmount();
        handles.resets.raise(&amazon).await;

        let report = screen.apply(pending.await);
        assert!(!report.applied);
        assert!(report.terms_reset);
        assert!(!screen.state().terms_accepted);

        let report = screen.mount().await;
        assert!(!report.terms_reset);
        assert!(!screen.state().terms_accepted);
        assert_eq!(screen.state().selected_amount, Some(amount(25.0)));
    }

    #[tokio::test]
    async fn remount_starts_with_terms_unaccepted() {
        let handles = SessionHandles::in_memory();
        let mut screen = ProductScreen::open(&catalog(), &ProductId::new("amazon"), &handles).unwrap();
        screen.mount().await;
        screen.select_amount(50.0).await.unwrap();
        assert!(screen.toggle_terms().intent().is_some());

        screen.unmount();
        let report = screen.mount().await;
        assert!(!report.terms_reset);
        assert!(!screen.state().terms_accepted);
        assert_eq!(screen.state().selected_amount, Some(amount(50.0)));
    }

    #[tokio::test]
    async fn restore_does_not_clobber_a_newer_pick() {
        let handles = SessionHandles::in_memory();
        let amazon = ProductId::new("amazon");
        handles.sessions.save(&amazon, amount(25.0)).await;

        let mut screen = ProductScreen::open(&catalog(), &amazon, &handles).unwrap();
        screen.mount().await;

        let pending = screen.refresh(RefreshTrigger::Focus);
        let refresh = pending.await;
        screen.select_amount(100.0).await.unwrap();

        let report = screen.apply(refresh);
        assert!(report.applied);
        assert_eq!(report.restored_amount, None);
        assert_eq!(screen.state().selected_amount, Some(amount(100.0)));
    }

    #[tokio::test]
    async fn focus_on_unmounted_screen_mounts_it() {
        let handles = SessionHandles::in_memory();
        let mut screen = ProductScreen::open(&catalog(), &ProductId::new("amazon"), &handles).unwrap();

        let report = screen.focus().await;
        assert_eq!(report.trigger, RefreshTrigger::Mount);
        assert!(screen.is_mounted());
    }
}
