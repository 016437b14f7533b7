//! Terms gate between "amount chosen" and "navigate to payment".
//!
//! ```text
//!            select_amount            toggle_terms (→ true)
//!   Idle ───────────────► AmountChosen ─────────────────────► Accepted
//!    │ ▲                      ▲   │ ▲                             │
//!    │ └ toggle_terms: no-op  │   │ └── toggle_terms (→ false) ───┤
//!    │   (logged)             │   └ select_amount                 │
//!    └────────────────────────┘                reset_from_signal ─┘
//! ```
//!
//! Every flip that lands on `true` emits a navigation intent as a side effect
//! of that transition. Re-selecting an amount keeps `terms_accepted`, and
//! clearing the amount does not clear it either; only the reset signal does.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::Product;
use crate::types::{Amount, NavigationIntent, ProductId};

// ═══════════════════════════════════════════════════════════════════════════════
// GATE STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// In-memory view state of one product screen. Never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateState {
    pub selected_amount: Option<Amount>,
    pub terms_accepted: bool,
}

/// Coarse status derived from [`GateState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    /// No amount selected; acceptance is irrelevant.
    Idle,
    /// Amount picked, terms not accepted.
    AmountChosen,
    /// Amount picked and terms accepted.
    Accepted,
}

impl GateState {
    pub fn status(&self) -> GateStatus {
        match (self.selected_amount, self.terms_accepted) {
            (None, _) => GateStatus::Idle,
            (Some(_), false) => GateStatus::AmountChosen,
            (Some(_), true) => GateStatus::Accepted,
        }
    }
}

/// Result of [`PurchaseGate::toggle_terms`].
#[derive(Clone, Debug, PartialEq)]
pub enum ToggleOutcome {
    /// No amount selected; nothing changed.
    Blocked,
    /// Terms flipped to accepted; the UI should navigate.
    Accepted(NavigationIntent),
    /// Terms flipped back off; no navigation.
    Withdrawn,
}

impl ToggleOutcome {
    pub fn intent(&self) -> Option<&NavigationIntent> {
        match self {
            ToggleOutcome::Accepted(intent) => Some(intent),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// INTENT TEMPLATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Product details carried into every navigation intent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GateProduct {
    pub product_id: ProductId,
    pub product_name: String,
    pub currency: String,
}

impl GateProduct {
    /// Title wins over name; an empty currency falls back to `default_currency`.
    pub fn from_product(product: &Product, default_currency: &str) -> Self {
        let product_name = if product.title.is_empty() {
            product.name.clone()
        } else {
            product.title.clone()
        };
        let currency = if product.currency.is_empty() {
            default_currency.to_string()
        } else {
            product.currency.clone()
        };

        Self {
            product_id: product.id.clone(),
            product_name,
            currency,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PURCHASE GATE
// ═══════════════════════════════════════════════════════════════════════════════

/// State machine over `(selected_amount, terms_accepted)` for one product.
///
/// All transitions are total.
#[derive(Clone, Debug)]
pub struct PurchaseGate {
    product: GateProduct,
    state: GateState,
}

impl PurchaseGate {
    pub fn new(product: GateProduct) -> Self {
        Self {
            product,
            state: GateState::default(),
        }
    }

    pub fn product(&self) -> &GateProduct {
        &self.product
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn status(&self) -> GateStatus {
        self.state.status()
    }

    pub fn selected_amount(&self) -> Option<Amount> {
        self.state.selected_amount
    }

    pub fn terms_accepted(&self) -> bool {
        self.state.terms_accepted
    }

    /// Pick an amount. Acceptance is left as is.
    pub fn select_amount(&mut self, amount: Amount) {
        debug!(product_id = %self.product.product_id, amount = %amount, "Selected amount");
        self.state.selected_amount = Some(amount);
    }

    /// Drop the selected amount. Acceptance is left as is.
    pub fn clear_selection(&mut self) {
        self.state.selected_amount = None;
    }

    /// Flip acceptance, guarded on a selected amount.
    pub fn toggle_terms(&mut self) -> ToggleOutcome {
        let Some(amount) = self.state.selected_amount else {
            info!(product_id = %self.product.product_id, "Please select an amount first");
            return ToggleOutcome::Blocked;
        };

        let accepted = !self.state.terms_accepted;
        self.state.terms_accepted = accepted;
        info!(product_id = %self.product.product_id, accepted, "Setting terms state");

        if !accepted {
            return ToggleOutcome::Withdrawn;
        }

        ToggleOutcome::Accepted(NavigationIntent {
            product_id: self.product.product_id.clone(),
            product_name: self.product.product_name.clone(),
            amount,
            currency: self.product.currency.clone(),
        })
    }

    /// Force acceptance off after the user backed out of payment.
    pub fn reset_from_signal(&mut self) {
        self.state.terms_accepted = false;
    }
}
