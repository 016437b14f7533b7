//! Static gift-card catalog.
//!
//! The catalog is read-only reference data, a JSON object mapping product id
//! to product. It is consulted at the UI boundary to validate amount picks;
//! the gate itself never re-checks them.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};
use crate::types::{Amount, ProductId};

/// One gift-card product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub background_color: String,
    #[serde(default)]
    pub text_color: String,
    #[serde(default)]
    pub badges: Vec<String>,
    /// Published face values.
    pub amounts: Vec<f64>,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub logo: String,
}

impl Product {
    /// Whether `amount` is one of the published face values.
    pub fn offers(&self, amount: Amount) -> bool {
        self.amounts.iter().any(|a| *a == amount.value())
    }

    /// Title if set, otherwise name.
    pub fn display_name(&self) -> &str {
        if self.title.is_empty() {
            &self.name
        } else {
            &self.title
        }
    }
}

/// Product lookup keyed by id.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    products: BTreeMap<ProductId, Product>,
}

impl Catalog {
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    /// Parse `{"<id>": {...product...}, ...}`.
    ///
    /// The map key wins if it disagrees with the product's own `id`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, Product> =
            serde_json::from_str(json).map_err(|e| SessionError::Catalog(e.to_string()))?;

        let products = raw
            .into_iter()
            .map(|(id, mut product)| {
                product.id = ProductId::new(id);
                product
            })
            .collect::<Vec<_>>();

        for product in &products {
            if product.amounts.iter().any(|a| !a.is_finite() || *a <= 0.0) {
                return Err(SessionError::Catalog(format!(
                    "product {} lists a non-positive amount",
                    product.id
                )));
            }
        }

        Ok(Self::new(products))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| SessionError::Catalog(format!("failed to read {}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.get(id)
    }

    /// Like [`Catalog::get`], but an unknown id is an error.
    pub fn require(&self, id: &ProductId) -> Result<&Product> {
        self.get(id)
            .ok_or_else(|| SessionError::UnknownProduct(id.to_string()))
    }

    /// All products in id order.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// First product (in id order) whose name contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Option<&Product> {
        let needle = query.trim().to_lowercase();
        self.products()
            .find(|p| p.name.to_lowercase().contains(&needle))
    }

    /// Check that `amount` is a published option of `product_id`.
    pub fn validate_amount(&self, product_id: &ProductId, amount: f64) -> Result<Amount> {
        let product = self.require(product_id)?;
        let amount = Amount::new(amount)?;
        if !product.offers(amount) {
            return Err(SessionError::AmountNotOffered {
                product_id: product_id.to_string(),
                amount: amount.value(),
            });
        }
        Ok(amount)
    }
}
