//! Backend doubles for tests.
//!
//! Enabled inside this crate's own tests and, for other crates, through the
//! `test-support` feature.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use ecofinds_core::ProductId;
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::backend::{BackendError, CartBackend};
use crate::order::{OrderConfirmation, OrderRequest};

/// Backend that answers every call at once and counts the calls.
#[derive(Debug, Clone, Default)]
pub struct ImmediateBackend {
    calls: Arc<AtomicUsize>,
}

impl ImmediateBackend {
    /// Create a new immediate backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of backend calls made so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl CartBackend for ImmediateBackend {
    async fn update_quantity(&self, _id: ProductId, _quantity: u32) -> Result<(), BackendError> {
        self.record();
        Ok(())
    }

    async fn remove_line(&self, _id: ProductId) -> Result<(), BackendError> {
        self.record();
        Ok(())
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<OrderConfirmation, BackendError> {
        self.record();
        Ok(confirm(order))
    }
}

/// Backend whose every call fails with the given error.
#[derive(Debug, Clone)]
pub struct FailingBackend {
    error: BackendError,
}

impl FailingBackend {
    /// Create a backend that always fails with `error`.
    #[must_use]
    pub const fn new(error: BackendError) -> Self {
        Self { error }
    }

    /// Backend that reports itself unreachable.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::new(BackendError::Unavailable("connection refused".to_string()))
    }
}

impl CartBackend for FailingBackend {
    async fn update_quantity(&self, _id: ProductId, _quantity: u32) -> Result<(), BackendError> {
        Err(self.error.clone())
    }

    async fn remove_line(&self, _id: ProductId) -> Result<(), BackendError> {
        Err(self.error.clone())
    }

    async fn place_order(&self, _order: &OrderRequest) -> Result<OrderConfirmation, BackendError> {
        Err(self.error.clone())
    }
}

/// Backend whose calls block until the test releases them.
///
/// Each call consumes one permit; [`GatedBackend::release`] hands out
/// permits. Useful for observing the ledger while a mutation is in flight.
#[derive(Debug, Clone)]
pub struct GatedBackend {
    gate: Arc<Semaphore>,
}

impl Default for GatedBackend {
    fn default() -> Self {
        Self {
            gate: Arc::new(Semaphore::new(0)),
        }
    }
}

impl GatedBackend {
    /// Create a closed gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `calls` blocked or future calls through.
    pub fn release(&self, calls: usize) {
        self.gate.add_permits(calls);
    }

    async fn pass(&self) -> Result<(), BackendError> {
        self.gate
            .acquire()
            .await
            .map(tokio::sync::SemaphorePermit::forget)
            .map_err(|e| BackendError::Unavailable(e.to_string()))
    }
}

impl CartBackend for GatedBackend {
    async fn update_quantity(&self, _id: ProductId, _quantity: u32) -> Result<(), BackendError> {
        self.pass().await
    }

    async fn remove_line(&self, _id: ProductId) -> Result<(), BackendError> {
        self.pass().await
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<OrderConfirmation, BackendError> {
        self.pass().await?;
        Ok(confirm(order))
    }
}

fn confirm(order: &OrderRequest) -> OrderConfirmation {
    OrderConfirmation {
        order_id: Uuid::new_v4(),
        total: order.totals.total,
        currency: order.totals.currency,
        placed_at: chrono::Utc::now(),
    }
}
