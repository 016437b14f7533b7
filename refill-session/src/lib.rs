//! Gift-card purchase session.
//!
//! This crate holds the stateful part of the purchase flow:
//!
//! - [`SessionStore`]: the single saved "current selection" slot
//!   (`{productId, amount, timestamp}`), filtered by product on load.
//! - [`ResetSignal`]: a per-product one-shot flag the payment screen raises
//!   when the user backs out, consumed by the product screen.
//! - [`PurchaseGate`]: the state machine over `(selected_amount,
//!   terms_accepted)` that emits a [`NavigationIntent`] whenever acceptance
//!   flips on with an amount selected.
//!
//! [`ProductScreen`] and [`PaymentScreen`] wire these together the way the
//! two screens of the app use them.
//!
//! # Flow
//!
//! ```text
//! ProductScreen                                   PaymentScreen
//!   mount/focus ─► load(id) ┐
//!              └─► consume(id) ─ true ─► reset_from_signal()
//!   pick amount ─► select_amount + save(id, amount)
//!   accept terms ─► toggle_terms ─ Accepted(intent) ──► new(intent)
//!                                                        back ─► raise(id)
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod gate;
pub mod payment;
pub mod reset;
pub mod screen;
pub mod session;
pub mod types;

pub use catalog::{Catalog, Product};
pub use config::{SessionConfig, SessionHandles};
pub use error::{Result, SessionError};
pub use gate::{GateProduct, GateState, GateStatus, PurchaseGate, ToggleOutcome};
pub use payment::{BackNavigation, PayOutcome, PaymentHandler, PaymentScreen};
pub use reset::{ResetSignal, RESET_KEY_PREFIX};
pub use screen::{ProductScreen, Refresh, RefreshReport, RefreshTrigger};
pub use session::{SessionStore, SELECTION_KEY};
pub use types::{Amount, NavigationIntent, ProductId, SelectionRecord, DEFAULT_CURRENCY};
