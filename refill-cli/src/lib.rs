//! refill command-line driver.
//!
//! Each invocation plays one step of the purchase flow against the configured
//! store. With the default durable medium, a selection made by `select` is
//! restored by a later `accept`, and a `back` is observed by the next command
//! that mounts the product screen.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use refill_session::{
    Catalog, GateProduct, NavigationIntent, PayOutcome, PaymentScreen, ProductId, ProductScreen,
    SessionConfig, SessionHandles, ToggleOutcome,
};
use refill_storage::StorageConfig;

/// Catalog bundled with the binary.
pub const BUNDLED_CATALOG: &str = include_str!("../data/products.json");

// ═══════════════════════════════════════════════════════════════════════════════
// ARGUMENTS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Parser)]
#[command(name = "refill", about = "Gift-card purchase session")]
pub struct Cli {
    /// JSON session config; defaults are used when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// JSON product catalog; the bundled catalog is used when omitted.
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Keep state in memory for this run only.
    #[arg(long)]
    pub volatile: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List products, or find the first whose name matches.
    Products {
        #[arg(long)]
        search: Option<String>,
    },
    /// Show a product and its restored purchase state.
    Show { product_id: String },
    /// Pick an amount for a product.
    Select { product_id: String, amount: f64 },
    /// Accept terms and print the payment navigation intent.
    Accept { product_id: String },
    /// Back out of the payment screen for a product.
    Back { product_id: String },
    /// Confirm payment for the saved selection.
    Pay { product_id: String },
}

// ═══════════════════════════════════════════════════════════════════════════════
// RUNNER
// ═══════════════════════════════════════════════════════════════════════════════

/// Resolve config and catalog from the arguments.
pub fn load_context(cli: &Cli) -> Result<(SessionHandles, Catalog)> {
    let mut config = match &cli.config {
        Some(path) => SessionConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if cli.volatile {
        config.storage = StorageConfig {
            namespace: config.storage.namespace.clone(),
            ..StorageConfig::volatile()
        };
    }

    let catalog = match &cli.catalog {
        Some(path) => Catalog::from_file(path)
            .with_context(|| format!("failed to load catalog {}", path.display()))?,
        None => Catalog::from_json_str(BUNDLED_CATALOG).context("bundled catalog is invalid")?,
    };

    let handles = config.open().context("failed to open session store")?;
    Ok((handles, catalog))
}

/// Execute one command and return its JSON output.
pub async fn run(
    command: &Command,
    handles: &SessionHandles,
    catalog: &Catalog,
) -> Result<serde_json::Value> {
    match command {
        Command::Products { search } => {
            let products: Vec<_> = match search {
                Some(query) => catalog.search(query).into_iter().collect(),
                None => catalog.products().collect(),
            };
            Ok(json!(products
                .iter()
                .map(|p| json!({
                    "id": p.id,
                    "name": p.display_name(),
                    "amounts": p.amounts,
                    "currency": p.currency,
                    "route": format!("/product/{}", p.id),
                }))
                .collect::<Vec<_>>()))
        }

        Command::Show { product_id } => {
            let mut screen = open_screen(catalog, product_id, handles)?;
            let report = screen.mount().await;
            Ok(json!({
                "product": screen.product(),
                "state": screen.state(),
                "status": screen.gate().status(),
                "termsReset": report.terms_reset,
            }))
        }

        Command::Select { product_id, amount } => {
            let mut screen = open_screen(catalog, product_id, handles)?;
            screen.mount().await;
            let amount = screen.select_amount(*amount).await?;
            tracing::info!("Selected {} for product {}", amount, product_id);
            Ok(json!({ "productId": product_id, "state": screen.state(), "selected": amount }))
        }

        Command::Accept { product_id } => {
            let mut screen = open_screen(catalog, product_id, handles)?;
            screen.mount().await;
            match screen.toggle_terms() {
                ToggleOutcome::Accepted(intent) => Ok(json!({
                    "navigate": NavigationIntent::PAYMENT_ROUTE,
                    "params": intent.to_params(),
                })),
                ToggleOutcome::Blocked => bail!("select an amount for {product_id} first"),
                ToggleOutcome::Withdrawn => Ok(json!({ "navigate": null })),
            }
        }

        Command::Back { product_id } => {
            let payment = payment_screen(catalog, product_id, handles).await?;
            let back = payment.back().await;
            Ok(json!({
                "navigate": format!("/product/{}", back.product_id),
                "resetRaised": back.reset_raised,
            }))
        }

        Command::Pay { product_id } => {
            let payment = payment_screen(catalog, product_id, handles).await?;
            let outcome = payment.pay().await;
            Ok(json!({
                "intent": payment.intent(),
                "submitted": outcome == PayOutcome::Submitted,
            }))
        }
    }
}

fn open_screen(catalog: &Catalog, product_id: &str, handles: &SessionHandles) -> Result<ProductScreen> {
    ProductScreen::open(catalog, &ProductId::new(product_id), handles)
        .with_context(|| format!("No product found: {product_id}"))
}

/// Rebuild the payment screen for the saved selection of `product_id`.
async fn payment_screen(
    catalog: &Catalog,
    product_id: &str,
    handles: &SessionHandles,
) -> Result<PaymentScreen> {
    let id = ProductId::new(product_id);
    let product = catalog
        .require(&id)
        .with_context(|| format!("No product found: {product_id}"))?;
    let Some(amount) = handles.sessions.load(&id).await else {
        bail!("no saved selection for {product_id}");
    };

    let gate_product = GateProduct::from_product(product, &handles.default_currency);
    let intent = NavigationIntent {
        product_id: gate_product.product_id,
        product_name: gate_product.product_name,
        amount,
        currency: gate_product.currency,
    };
    Ok(PaymentScreen::new(intent, handles.resets.clone()))
}
