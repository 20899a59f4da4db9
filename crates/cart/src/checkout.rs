//! Checkout: form validation and order placement.
//!
//! Checkout reads the ledger but never mutates it. The order is built from a
//! single snapshot, so the lines and totals the backend receives always
//! agree with each other.

use std::collections::BTreeMap;

use ecofinds_core::ProductId;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::backend::{BackendError, CartBackend};
use crate::ledger::CartLedger;
use crate::order::{Contact, OrderConfirmation, OrderRequest, ShippingAddress};

const CARD_NUMBER_DIGITS: std::ops::RangeInclusive<usize> = 12..=19;
const CVV_DIGITS: std::ops::RangeInclusive<usize> = 3..=4;

/// Fields of the checkout form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutField {
    Email,
    FirstName,
    LastName,
    Address,
    City,
    State,
    ZipCode,
    CardNumber,
    ExpiryDate,
    Cvv,
    NameOnCard,
}

impl CheckoutField {
    /// Human-readable field label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::FirstName => "First name",
            Self::LastName => "Last name",
            Self::Address => "Address",
            Self::City => "City",
            Self::State => "State",
            Self::ZipCode => "ZIP code",
            Self::CardNumber => "Card number",
            Self::ExpiryDate => "Expiry date",
            Self::Cvv => "CVV",
            Self::NameOnCard => "Name on card",
        }
    }
}

/// Validation messages keyed by field.
pub type FieldErrors = BTreeMap<CheckoutField, String>;

/// Errors that can occur when placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// There is nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// A row is still being updated or removed.
    #[error("cart has pending changes for items {0:?}")]
    CartBusy(Vec<ProductId>),

    /// One or more form fields are missing or malformed.
    #[error("checkout form has {} invalid field(s)", .0.len())]
    InvalidForm(FieldErrors),

    /// The backend failed to place the order.
    #[error("order placement failed: {0}")]
    Backend(#[from] BackendError),
}

/// Shopper-entered checkout details.
///
/// Implements `Debug` manually to redact payment fields.
#[derive(Clone)]
pub struct CheckoutForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    /// Card number (spaces and dashes allowed)
    pub card_number: SecretString,
    /// Expiry in `MM/YY` form
    pub expiry_date: String,
    pub cvv: SecretString,
    pub name_on_card: String,
}

impl std::fmt::Debug for CheckoutForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutForm")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("address", &self.address)
            .field("city", &self.city)
            .field("state", &self.state)
            .field("zip_code", &self.zip_code)
            .field("card_number", &"[REDACTED]")
            .field("expiry_date", &self.expiry_date)
            .field("cvv", &"[REDACTED]")
            .field("name_on_card", &self.name_on_card)
            .finish()
    }
}

impl CheckoutForm {
    /// Validate every field and collect all problems at once.
    ///
    /// # Errors
    ///
    /// Returns the message for each missing or malformed field. A missing
    /// field reports "<Label> is required"; format checks run only on
    /// non-empty values.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        let required = [
            (CheckoutField::Email, self.email.as_str()),
            (CheckoutField::FirstName, self.first_name.as_str()),
            (CheckoutField::LastName, self.last_name.as_str()),
            (CheckoutField::Address, self.address.as_str()),
            (CheckoutField::City, self.city.as_str()),
            (CheckoutField::State, self.state.as_str()),
            (CheckoutField::ZipCode, self.zip_code.as_str()),
            (CheckoutField::CardNumber, self.card_number.expose_secret()),
            (CheckoutField::ExpiryDate, self.expiry_date.as_str()),
            (CheckoutField::Cvv, self.cvv.expose_secret()),
            (CheckoutField::NameOnCard, self.name_on_card.as_str()),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                errors.insert(field, format!("{} is required", field.label()));
            }
        }

        if !errors.contains_key(&CheckoutField::Email) && !is_valid_email(&self.email) {
            errors.insert(
                CheckoutField::Email,
                "Enter a valid email address".to_string(),
            );
        }
        if !errors.contains_key(&CheckoutField::CardNumber)
            && !is_valid_card_number(self.card_number.expose_secret())
        {
            errors.insert(
                CheckoutField::CardNumber,
                "Enter a valid card number".to_string(),
            );
        }
        if !errors.contains_key(&CheckoutField::ExpiryDate) && !is_valid_expiry(&self.expiry_date) {
            errors.insert(CheckoutField::ExpiryDate, "Use MM/YY format".to_string());
        }
        if !errors.contains_key(&CheckoutField::Cvv) && !is_valid_cvv(self.cvv.expose_secret()) {
            errors.insert(CheckoutField::Cvv, "Enter a valid CVV".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn contact(&self) -> Contact {
        Contact {
            email: self.email.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
        }
    }

    fn shipping_address(&self) -> ShippingAddress {
        ShippingAddress {
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            zip_code: self.zip_code.trim().to_string(),
        }
    }
}

/// Place an order for the ledger's current contents.
///
/// # Errors
///
/// - [`CheckoutError::EmptyCart`] if the cart has no lines.
/// - [`CheckoutError::CartBusy`] if any row has a mutation in flight.
/// - [`CheckoutError::InvalidForm`] if the form fails validation.
/// - [`CheckoutError::Backend`] if the backend fails to place the order.
#[instrument(skip(ledger, form))]
pub async fn place_order<B: CartBackend>(
    ledger: &CartLedger<B>,
    form: &CheckoutForm,
) -> Result<OrderConfirmation, CheckoutError> {
    let snapshot = ledger.snapshot().await;

    if snapshot.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    if snapshot.has_pending() {
        let mut busy = snapshot.pending_quantity_ids();
        busy.extend(snapshot.pending_removal_ids());
        return Err(CheckoutError::CartBusy(busy));
    }
    form.validate().map_err(CheckoutError::InvalidForm)?;

    let request = OrderRequest {
        lines: snapshot.lines.into_iter().map(|line| line.item).collect(),
        totals: snapshot.totals,
        contact: form.contact(),
        shipping_address: form.shipping_address(),
    };

    match ledger.backend().place_order(&request).await {
        Ok(confirmation) => {
            info!(
                order_id = %confirmation.order_id,
                total = %confirmation.display_total(),
                "Order placed"
            );
            Ok(confirmation)
        }
        Err(e) => {
            warn!(error = %e, "Order placement failed");
            Err(e.into())
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

fn digits_only(value: &str, separators: &[char]) -> Option<usize> {
    let mut count = 0;
    for c in value.trim().chars() {
        if c.is_ascii_digit() {
            count += 1;
        } else if !separators.contains(&c) {
            return None;
        }
    }
    Some(count)
}

fn is_valid_card_number(number: &str) -> bool {
    digits_only(number, &[' ', '-']).is_some_and(|count| CARD_NUMBER_DIGITS.contains(&count))
}

fn is_valid_cvv(cvv: &str) -> bool {
    digits_only(cvv, &[]).is_some_and(|count| CVV_DIGITS.contains(&count))
}

fn is_valid_expiry(expiry: &str) -> bool {
    let Some((month, year)) = expiry.trim().split_once('/') else {
        return false;
    };
    let two_digits = |s: &str| s.len() == 2 && s.chars().all(|c| c.is_ascii_digit());
    two_digits(month)
        && two_digits(year)
        && month.parse::<u8>().is_ok_and(|m| (1..=12).contains(&m))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use ecofinds_core::LineStatus;
    use rust_decimal::Decimal;

    use super::*;
    use crate::config::PricingConfig;
    use crate::line::LineItem;
    use crate::testing::{FailingBackend, GatedBackend, ImmediateBackend};

    fn valid_form() -> CheckoutForm {
        CheckoutForm {
            email: "asha@example.com".to_string(),
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

    fn empty_form() -> CheckoutForm {
        CheckoutForm {
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            card_number: SecretString::from(""),
            expiry_date: String::new(),
            cvv: SecretString::from(""),
            name_on_card: String::new(),
        }
    }

    fn seeded<B: CartBackend>(backend: B) -> CartLedger<B> {
        let items = vec![
            LineItem::new(ProductId::new(1), "Bottle", Decimal::new(199_999, 2), 2).unwrap(),
            LineItem::new(ProductId::new(2), "Shirt", Decimal::new(250_000, 2), 1).unwrap(),
        ];
        CartLedger::new(items, PricingConfig::default(), backend).unwrap()
    }

    #[test]
    fn test_valid_form_passes() {
        assert!(valid_form().validate().is_ok());
    }

    #[test]
    fn test_empty_form_reports_every_field() {
        let errors = empty_form().validate().unwrap_err();
        assert_eq!(errors.len(), 11);
        assert_eq!(errors[&CheckoutField::Email], "Email is required");
        assert_eq!(errors[&CheckoutField::ZipCode], "ZIP code is required");
        assert_eq!(errors[&CheckoutField::Cvv], "CVV is required");
        assert_eq!(errors[&CheckoutField::NameOnCard], "Name on card is required");
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let mut form = valid_form();
        form.city = "   ".to_string();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors[&CheckoutField::City], "City is required");
    }

    #[test]
    fn test_format_checks() {
        let mut form = valid_form();
        form.email = "asha.example.com".to_string();
        form.card_number = SecretString::from("4111-1111");
        form.expiry_date = "13/29".to_string();
        form.cvv = SecretString::from("12a");

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors[&CheckoutField::Email], "Enter a valid email address");
        assert_eq!(errors[&CheckoutField::CardNumber], "Enter a valid card number");
        assert_eq!(errors[&CheckoutField::ExpiryDate], "Use MM/YY format");
        assert_eq!(errors[&CheckoutField::Cvv], "Enter a valid CVV");
    }

    #[test]
    fn test_field_helpers() {
        assert!(is_valid_email("a@b"));
        assert!(!is_valid_email("@b"));
        assert!(!is_valid_email("a@"));
        assert!(!is_valid_email("a@b@c"));
        assert!(is_valid_card_number("4111-1111-1111-1111"));
        assert!(!is_valid_card_number("4111 1111 1111 111x"));
        assert!(is_valid_expiry("01/30"));
        assert!(!is_valid_expiry("00/30"));
        assert!(!is_valid_expiry("1/30"));
        assert!(is_valid_cvv("1234"));
        assert!(!is_valid_cvv("12345"));
    }

    #[test]
    fn test_debug_redacts_payment_fields() {
        let debug_output = format!("{:?}", valid_form());

        assert!(debug_output.contains("asha@example.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("4111"));
        assert!(!debug_output.contains("\"123\""));
    }

    #[tokio::test]
    async fn test_place_order() {
        let backend = ImmediateBackend::new();
        let ledger = seeded(backend.clone());

        let confirmation = place_order(&ledger, &valid_form()).await.unwrap();
        assert_eq!(confirmation.total, Decimal::new(76_699_764, 4));
        assert_eq!(confirmation.display_total(), "₹7669.98");
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_form_does_not_reach_backend() {
        let backend = ImmediateBackend::new();
        let ledger = seeded(backend.clone());

        let err = place_order(&ledger, &empty_form()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidForm(ref fields) if fields.len() == 11));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let ledger =
            CartLedger::new(Vec::new(), PricingConfig::default(), ImmediateBackend::new()).unwrap();
        let err = place_order(&ledger, &valid_form()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
    }

    #[tokio::test]
    async fn test_pending_rows_block_checkout() {
        let backend = GatedBackend::new();
        let ledger = seeded(backend.clone());
        let id = ProductId::new(2);

        let removal = tokio::spawn({
            let ledger = ledger.clone();
            async move { ledger.remove_item(id).await }
        });
        while ledger.snapshot().await.status_of(id) != Some(LineStatus::RemovalPending) {
            tokio::task::yield_now().await;
        }

        let err = place_order(&ledger, &valid_form()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::CartBusy(ref ids) if ids == &vec![id]));

        backend.release(1);
        removal.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_backend_failure_is_reported() {
        let ledger = seeded(FailingBackend::unavailable());
        let err = place_order(&ledger, &valid_form()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Backend(BackendError::Unavailable(_))));
    }
}
