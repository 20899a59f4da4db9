//! Integration tests for the EcoFinds cart.
//!
//! The tests under `tests/` drive [`ecofinds_cart::CartLedger`] through its
//! public API only, using the simulated backend under paused tokio time or
//! the doubles from `ecofinds_cart::testing`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ecofinds-integration-tests
//! ```

use ecofinds_cart::{CartBackend, CartLedger, CheckoutForm, LineItem, LineItemError, PricingConfig};
use ecofinds_core::ProductId;
use rust_decimal::Decimal;
use secrecy::SecretString;

/// The two-line reference cart: 1999.99 x 2 and 2500.00 x 1.
///
/// # Errors
///
/// Never fails for these fixed values; the `Result` mirrors [`LineItem::new`].
pub fn reference_items() -> Result<Vec<LineItem>, LineItemError> {
    Ok(vec![
        LineItem::new(ProductId::new(1), "Bamboo Water Bottle", Decimal::new(199_999, 2), 2)?,
        LineItem::new(ProductId::new(2), "Organic Cotton T-Shirt", Decimal::new(250_000, 2), 1)?,
    ])
}

/// Ledger over the reference cart with the default pricing policy.
///
/// # Errors
///
/// Returns an error if the fixture lines are invalid.
pub fn reference_ledger<B: CartBackend>(
    backend: B,
) -> Result<CartLedger<B>, Box<dyn std::error::Error>> {
    Ok(CartLedger::new(reference_items()?, PricingConfig::default(), backend)?)
}

/// A checkout form that passes validation.
#[must_use]
pub fn valid_form() -> CheckoutForm {
    CheckoutForm {
        email: "asha@example.in".to_string(),
        first_name: "Asha".to_string(),
        last_name: "Rao".to_string(),
        address: "12 MG Road".to_string(),
        city: "Bengaluru".to_string(),
        state: "KA".to_string(),
        zip_code: "560001".to_string(),
        card_number: SecretString::from("4111 1111 1111 1111"),
        expiry_date: "09/29".to_string(),
        cvv: SecretString::from("123"),
        name_on_card: "Asha Rao".to_string(),
    }
}
