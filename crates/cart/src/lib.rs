//! EcoFinds Cart - cart ledger, pricing policy, and checkout.
//!
//! # Architecture
//!
//! - [`ledger::CartLedger`] holds the ordered cart lines and a status per
//!   row. Quantity changes and removals round-trip through a
//!   [`backend::CartBackend`] without holding the ledger lock, so different
//!   rows can be edited concurrently while a busy row rejects new requests.
//! - [`pricing::Totals`] derives subtotal, shipping, tax, and total from the
//!   lines on every read. Amounts are never rounded until display.
//! - [`checkout`] validates the shopper's details and places an order for a
//!   consistent snapshot of the cart.
//! - [`view`] turns a snapshot into display strings and per-row control
//!   state for a cart page.
//!
//! # Example
//!
//! ```rust
//! use ecofinds_cart::backend::SimulatedBackend;
//! use ecofinds_cart::config::{LatencyConfig, PricingConfig};
//! use ecofinds_cart::ledger::CartLedger;
//! use ecofinds_cart::seed::demo_items;
//! use ecofinds_core::ProductId;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SimulatedBackend::new(LatencyConfig::immediate());
//! let ledger = CartLedger::new(demo_items()?, PricingConfig::default(), backend)?;
//!
//! let snapshot = ledger.update_quantity(ProductId::new(2), 3).await?;
//! assert_eq!(snapshot.totals.item_count, 6);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod ledger;
pub mod line;
pub mod order;
pub mod pricing;
pub mod seed;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod view;

pub use backend::{BackendError, CartBackend, SimulatedBackend};
pub use catalog::{Catalog, Category, Product, UnknownCategory};
pub use checkout::{CheckoutError, CheckoutField, CheckoutForm, FieldErrors, place_order};
pub use config::{CartConfig, ConfigError, LatencyConfig, PricingConfig};
pub use error::CartError;
pub use ledger::{CartLedger, CartSnapshot, LineSnapshot};
pub use line::{LineItem, LineItemError};
pub use order::{Contact, OrderConfirmation, OrderRequest, ShippingAddress};
pub use pricing::Totals;
pub use view::{CartItemView, CartView, SummaryView};
