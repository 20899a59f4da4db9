//! Cart display data for the presentation layer.
//!
//! Everything a cart page needs to render is derived here from a
//! [`CartSnapshot`]: formatted prices, per-row control state while a
//! mutation is pending, and the order summary.

use ecofinds_core::{LineStatus, Price};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::ledger::{CartSnapshot, LineSnapshot};
use crate::pricing::Totals;

/// Shown in place of the quantity while a quantity change is pending.
pub const QUANTITY_PLACEHOLDER: &str = "...";

/// Cart item display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItemView {
    pub id: i32,
    pub title: String,
    pub quantity: u32,
    pub quantity_label: String,
    pub price: String,
    pub line_price: String,
    pub can_decrement: bool,
    pub can_increment: bool,
    pub can_remove: bool,
    pub is_removing: bool,
    pub remove_label: &'static str,
    pub error: Option<String>,
}

/// Order summary display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryView {
    /// e.g. "Subtotal (4 items)"
    pub subtotal_label: String,
    pub subtotal: String,
    /// Formatted fee or "FREE"
    pub shipping: String,
    pub tax: String,
    pub total: String,
    /// Banner shown when shipping is waived
    pub free_shipping_note: Option<String>,
}

/// Cart display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    /// e.g. "3 items in your cart"
    pub heading: String,
    pub items: Vec<CartItemView>,
    /// Absent for an empty cart.
    pub summary: Option<SummaryView>,
}

impl CartView {
    /// Build the view with the free-shipping threshold used for the banner.
    #[must_use]
    pub fn new(snapshot: &CartSnapshot, free_shipping_threshold: Decimal) -> Self {
        let totals = &snapshot.totals;
        let count = snapshot.len();

        Self {
            heading: format!("{count} {} in your cart", plural(count, "item", "items")),
            items: snapshot
                .lines
                .iter()
                .map(|line| CartItemView::new(line, totals))
                .collect(),
            summary: (!snapshot.is_empty())
                .then(|| SummaryView::new(totals, totals.price(free_shipping_threshold))),
        }
    }
}

impl CartItemView {
    fn new(line: &LineSnapshot, totals: &Totals) -> Self {
        let item = &line.item;
        let idle = line.status.is_idle();
        let is_removing = line.status == LineStatus::RemovalPending;

        Self {
            id: item.id().as_i32(),
            title: item.name().to_string(),
            quantity: item.quantity(),
            quantity_label: if line.status == LineStatus::QuantityPending {
                QUANTITY_PLACEHOLDER.to_string()
            } else {
                item.quantity().to_string()
            },
            price: totals.price(item.unit_price()).display(),
            line_price: totals.price(item.line_total()).display(),
            can_decrement: idle && item.quantity() > 1,
            can_increment: idle,
            can_remove: idle,
            is_removing,
            remove_label: if is_removing { "Removing..." } else { "Remove" },
            error: line.error.clone(),
        }
    }
}

impl SummaryView {
    fn new(totals: &Totals, threshold: Price) -> Self {
        let count = totals.item_count;
        let free = totals.is_free_shipping();

        Self {
            subtotal_label: format!(
                "Subtotal ({count} {})",
                plural(usize::try_from(count).unwrap_or(usize::MAX), "item", "items")
            ),
            subtotal: totals.price(totals.subtotal).display(),
            shipping: if free {
                "FREE".to_string()
            } else {
                totals.price(totals.shipping).display()
            },
            tax: totals.price(totals.tax).display(),
            total: totals.price(totals.total).display(),
            free_shipping_note: free
                .then(|| format!("Free shipping on orders over {}!", threshold.display())),
        }
    }
}

const fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}
