//! Core types for the purchase session.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

/// Currency used when a product does not name one.
pub const DEFAULT_CURRENCY: &str = "USD";

// ═══════════════════════════════════════════════════════════════════════════════
// IDENTIFIERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Catalog product identifier, e.g. `"amazon"`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// AMOUNT
// ═══════════════════════════════════════════════════════════════════════════════

/// A gift-card face value in the product's currency.
///
/// Always positive and finite. Whether the value is one of the product's
/// published options is checked by the catalog, not here.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Amount(f64);

impl Amount {
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(SessionError::InvalidAmount(value.to_string()))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Parse a route parameter or user input such as `"25"` or `"12.5"`.
    pub fn parse(raw: &str) -> Result<Self> {
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| SessionError::InvalidAmount(raw.to_string()))?;
        Self::new(value)
    }
}

impl TryFrom<f64> for Amount {
    type Error = SessionError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for f64 {
    fn from(amount: Amount) -> f64 {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // f64's Display already drops a zero fraction ("25", "12.5")
        write!(f, "{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SELECTION RECORD
// ═══════════════════════════════════════════════════════════════════════════════

/// The single persisted "current selection".
///
/// Stored as `{"productId": ..., "amount": ..., "timestamp": "<ISO-8601>"}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRecord {
    pub product_id: ProductId,
    pub amount: Amount,
    pub timestamp: DateTime<Utc>,
}

impl SelectionRecord {
    /// A record stamped with the current time.
    pub fn now(product_id: ProductId, amount: Amount) -> Self {
        Self {
            product_id,
            amount,
            timestamp: Utc::now(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NAVIGATION INTENT
// ═══════════════════════════════════════════════════════════════════════════════

/// Where the UI should go once the terms gate opens, and with what.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationIntent {
    pub product_id: ProductId,
    pub product_name: String,
    pub amount: Amount,
    pub currency: String,
}

impl NavigationIntent {
    /// Route path of the payment confirmation screen.
    pub const PAYMENT_ROUTE: &'static str = "/payment";

    /// Render as string route parameters.
    pub fn to_params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("productId".to_string(), self.product_id.to_string());
        params.insert("productName".to_string(), self.product_name.clone());
        params.insert("amount".to_string(), self.amount.to_string());
        params.insert("currency".to_string(), self.currency.clone());
        params
    }

    /// Parse route parameters on the payment side.
    ///
    /// `productId` and a positive numeric `amount` are required; a missing
    /// name is left empty and a missing currency falls back to USD.
    pub fn from_params(params: &BTreeMap<String, String>) -> Result<Self> {
        let product_id = params
            .get("productId")
            .filter(|id| !id.is_empty())
            .ok_or_else(|| SessionError::InvalidParams("missing productId".into()))?;

        let raw_amount = params
            .get("amount")
            .ok_or_else(|| SessionError::InvalidParams("missing amount".into()))?;
        let amount = Amount::parse(raw_amount)
            .map_err(|_| SessionError::InvalidParams(format!("bad amount {raw_amount:?}")))?;

        Ok(Self {
            product_id: ProductId::new(product_id.clone()),
            product_name: params.get("productName").cloned().unwrap_or_default(),
            amount,
            currency: params
                .get("currency")
                .filter(|c| !c.is_empty())
                .cloned()
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        })
    }
}
