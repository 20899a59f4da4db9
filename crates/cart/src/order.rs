//! Order payloads exchanged with the backend at checkout.
//!
//! Payment card data never appears here; it stays inside the checkout form.

use chrono::{DateTime, Utc};
use ecofinds_core::{CurrencyCode, Price};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::line::LineItem;
use crate::pricing::Totals;

/// Who placed the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Where the order ships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// Everything the backend needs to place an order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    /// Lines as they were when checkout started.
    pub lines: Vec<LineItem>,
    /// Totals derived from `lines`.
    pub totals: Totals,
    pub contact: Contact,
    pub shipping_address: ShippingAddress,
}

/// Backend acknowledgement of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderConfirmation {
    /// Order number assigned by the backend.
    pub order_id: Uuid,
    /// Amount charged, unrounded.
    pub total: Decimal,
    #[serde(skip)]
    pub currency: CurrencyCode,
    pub placed_at: DateTime<Utc>,
}

impl OrderConfirmation {
    /// Amount charged, formatted for display.
    #[must_use]
    pub fn display_total(&self) -> String {
        Price::new(self.total, self.currency).display()
    }
}
