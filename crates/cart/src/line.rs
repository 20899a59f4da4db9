//! Cart line items.

use ecofinds_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when building a [`LineItem`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineItemError {
    /// Quantity must be at least 1.
    #[error("quantity must be at least 1 (got {0})")]
    ZeroQuantity(u32),
    /// Unit price must not be negative.
    #[error("unit price must not be negative (got {0})")]
    NegativePrice(Decimal),
    /// `unit_price × quantity` does not fit a `Decimal`.
    #[error("line total overflows: {unit_price} x {quantity}")]
    TotalOverflow { unit_price: Decimal, quantity: u32 },
}

/// One product entry in the cart.
///
/// ## Constraints
///
/// - `quantity >= 1`
/// - `unit_price >= 0`
/// - `unit_price × quantity` is representable
///
/// Both are checked on construction and on deserialization, so a
/// `LineItem` in hand is always valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLineItem")]
pub struct LineItem {
    id: ProductId,
    name: String,
    unit_price: Decimal,
    quantity: u32,
}

/// Unvalidated shape of a line item as it appears in seed files.
#[derive(Deserialize)]
struct RawLineItem {
    id: ProductId,
    name: String,
    unit_price: Decimal,
    quantity: u32,
}

impl TryFrom<RawLineItem> for LineItem {
    type Error = LineItemError;

    fn try_from(raw: RawLineItem) -> Result<Self, Self::Error> {
        Self::new(raw.id, raw.name, raw.unit_price, raw.quantity)
    }
}

impl LineItem {
    /// Create a validated line item.
    ///
    /// # Errors
    ///
    /// Returns an error if `quantity` is zero, `unit_price` is negative, or
    /// the line total overflows.
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
    ) -> Result<Self, LineItemError> {
        if quantity == 0 {
            return Err(LineItemError::ZeroQuantity(quantity));
        }
        if unit_price < Decimal::ZERO {
            return Err(LineItemError::NegativePrice(unit_price));
        }
        if unit_price.checked_mul(Decimal::from(quantity)).is_none() {
            return Err(LineItemError::TotalOverflow {
                unit_price,
                quantity,
            });
        }
        Ok(Self {
            id,
            name: name.into(),
            unit_price,
            quantity,
        })
    }

    /// Product this line refers to; unique within a cart.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.id
    }

    /// Product display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Price of a single unit.
    #[must_use]
    pub const fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Number of units, always at least 1.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `unit_price × quantity`, unrounded.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        // Representable by construction.
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }

    /// The same product with a different quantity.
    ///
    /// # Errors
    ///
    /// Returns an error under the same rules as [`LineItem::new`].
    pub fn with_quantity(&self, quantity: u32) -> Result<Self, LineItemError> {
        Self::new(self.id, self.name.clone(), self.unit_price, quantity)
    }
}
