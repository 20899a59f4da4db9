//! Integration tests for checkout.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use ecofinds_cart::testing::{FailingBackend, GatedBackend, ImmediateBackend};
use ecofinds_cart::{
    BackendError, CheckoutError, CheckoutField, LatencyConfig, SimulatedBackend, place_order,
};
use ecofinds_core::{LineStatus, ProductId};
use ecofinds_integration_tests::{reference_ledger, valid_form};
use rust_decimal::Decimal;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn test_order_is_placed_after_simulated_latency() {
    let ledger = reference_ledger(SimulatedBackend::new(LatencyConfig::default())).unwrap();
    let start = Instant::now();

    let confirmation = place_order(&ledger, &valid_form()).await.unwrap();

    assert!(start.elapsed() >= Duration::from_secs(3));
    assert_eq!(confirmation.total, Decimal::new(76_699_764, 4));
    assert_eq!(confirmation.display_total(), "₹7669.98");
}

#[tokio::test]
async fn test_order_leaves_cart_untouched() {
    let ledger = reference_ledger(ImmediateBackend::new()).unwrap();
    let before = ledger.snapshot().await;

    place_order(&ledger, &valid_form()).await.unwrap();

    assert_eq!(ledger.snapshot().await, before);
}

#[tokio::test]
async fn test_empty_cart_cannot_be_ordered() {
    let backend = ImmediateBackend::new();
    let ledger = reference_ledger(backend.clone()).unwrap();
    ledger.remove_item(ProductId::new(1)).await.unwrap();
    ledger.remove_item(ProductId::new(2)).await.unwrap();

    let result = place_order(&ledger, &valid_form()).await;

    assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn test_busy_cart_cannot_be_ordered() {
    let backend = GatedBackend::new();
    let ledger = reference_ledger(backend.clone()).unwrap();
    let id = ProductId::new(2);

    let task = tokio::spawn({
        let ledger = ledger.clone();
        async move { ledger.remove_item(id).await }
    });
    while ledger.snapshot().await.status_of(id) != Some(LineStatus::RemovalPending) {
        tokio::task::yield_now().await;
    }

    let result = place_order(&ledger, &valid_form()).await;
    assert!(matches!(result, Err(CheckoutError::CartBusy(ids)) if ids == vec![id]));

    backend.release(2);
    task.await.unwrap().unwrap();
    let confirmation = place_order(&ledger, &valid_form()).await.unwrap();
    assert_eq!(confirmation.total, Decimal::new(49_189_764, 4));
}

#[tokio::test]
async fn test_invalid_form_reports_every_field() {
    let backend = ImmediateBackend::new();
    let ledger = reference_ledger(backend.clone()).unwrap();
    let mut form = valid_form();
    form.email = "asha.example.in".to_string();
    form.city = "   ".to_string();
    form.cvv = "12".into();

    let result = place_order(&ledger, &form).await;
    let Err(CheckoutError::InvalidForm(errors)) = result else {
        panic!("expected form errors");
    };

    assert_eq!(errors.len(), 3);
    assert_eq!(
        errors.get(&CheckoutField::City).map(String::as_str),
        Some("City is required")
    );
    assert!(errors.contains_key(&CheckoutField::Email));
    assert!(errors.contains_key(&CheckoutField::Cvv));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_backend_failure_is_reported() {
    let ledger = reference_ledger(FailingBackend::new(BackendError::Rejected(
        "card declined".to_string(),
    )))
    .unwrap();

    let result = place_order(&ledger, &valid_form()).await;

    assert!(matches!(
        result,
        Err(CheckoutError::Backend(BackendError::Rejected(ref message))) if message == "card declined"
    ));
}
