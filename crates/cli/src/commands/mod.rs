//! CLI command implementations.

pub mod cart;
pub mod checkout;
pub mod products;

use std::path::Path;

use ecofinds_cart::{
    CartConfig, CartLedger, CartView, LatencyConfig, SimulatedBackend, seed,
};
use tracing::info;

/// A seeded cart plus the options that shape how it is rendered.
pub struct Session {
    pub ledger: CartLedger<SimulatedBackend>,
    pub config: CartConfig,
    pub json: bool,
}

impl Session {
    /// Load configuration and seed a fresh ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or the seed file is invalid.
    pub async fn open(
        seed_path: Option<&Path>,
        no_latency: bool,
        json: bool,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = CartConfig::from_env()?;
        if no_latency {
            config.latency = LatencyConfig::immediate();
        }

        let items = match seed_path {
            Some(path) => seed::load_seed(path).await?,
            None => seed::demo_items()?,
        };

        info!(
            currency = %config.pricing.currency,
            threshold = %config.pricing.free_shipping_threshold,
            fee = %config.pricing.flat_shipping_fee,
            tax_rate = %config.pricing.tax_rate,
            "Cart opened"
        );

        let backend = SimulatedBackend::new(config.latency);
        let ledger = CartLedger::new(items, config.pricing.clone(), backend)?;

        Ok(Self {
            ledger,
            config,
            json,
        })
    }

    /// Render the current cart.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub async fn render(&self) -> Result<(), Box<dyn std::error::Error>> {
        let snapshot = self.ledger.snapshot().await;
        let view = CartView::new(&snapshot, self.config.pricing.free_shipping_threshold);

        if self.json {
            print_json(&view)?;
            return Ok(());
        }

        info!("{}", view.heading);
        for item in &view.items {
            info!(
                "  #{} {} - {} x {} = {}{}",
                item.id,
                item.title,
                item.price,
                item.quantity_label,
                item.line_price,
                item.error
                    .as_deref()
                    .map(|e| format!(" (error: {e})"))
                    .unwrap_or_default()
            );
        }
        if let Some(summary) = &view.summary {
            info!("{}: {}", summary.subtotal_label, summary.subtotal);
            info!("Shipping: {}", summary.shipping);
            info!("Tax: {}", summary.tax);
            info!("Total: {}", summary.total);
            if let Some(note) = &summary.free_shipping_note {
                info!("{note}");
            }
        }
        Ok(())
    }
}

/// Write a value to stdout as pretty JSON.
#[allow(clippy::print_stdout)]
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
