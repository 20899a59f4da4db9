//! Backend port used by the cart ledger and checkout.
//!
//! The ledger never talks to a network directly. Every round trip goes
//! through a [`CartBackend`], which lets the storefront run against the
//! in-process [`SimulatedBackend`] while tests substitute immediate,
//! failing, or manually released implementations.

use std::future::Future;

use ecofinds_core::ProductId;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::config::LatencyConfig;
use crate::order::{OrderConfirmation, OrderRequest};

/// Errors a backend round trip can produce.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The backend could not be reached or timed out. Retrying may succeed.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend refused the request.
    #[error("backend rejected request: {0}")]
    Rejected(String),
}

/// Asynchronous operations the cart depends on.
///
/// Implementations must be shareable across tasks; the ledger calls them
/// without holding any lock.
pub trait CartBackend: Send + Sync + 'static {
    /// Persist a new quantity for a line.
    fn update_quantity(
        &self,
        id: ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Delete a line.
    fn remove_line(&self, id: ProductId) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Submit an order for the current cart.
    fn place_order(
        &self,
        order: &OrderRequest,
    ) -> impl Future<Output = Result<OrderConfirmation, BackendError>> + Send;
}

/// In-process backend that waits a fixed latency and always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedBackend {
    latency: LatencyConfig,
}

impl SimulatedBackend {
    /// Create a simulated backend with the given round-trip latencies.
    #[must_use]
    pub const fn new(latency: LatencyConfig) -> Self {
        Self { latency }
    }

    /// The configured latencies.
    #[must_use]
    pub const fn latency(&self) -> LatencyConfig {
        self.latency
    }
}

impl CartBackend for SimulatedBackend {
    #[instrument(skip(self), level = "debug")]
    async fn update_quantity(&self, id: ProductId, quantity: u32) -> Result<(), BackendError> {
        tokio::time::sleep(self.latency.quantity_update).await;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn remove_line(&self, id: ProductId) -> Result<(), BackendError> {
        tokio::time::sleep(self.latency.removal).await;
        Ok(())
    }

    #[instrument(skip(self, order), fields(lines = order.lines.len()), level = "debug")]
    async fn place_order(&self, order: &OrderRequest) -> Result<OrderConfirmation, BackendError> {
        tokio::time::sleep(self.latency.order_placement).await;
        Ok(OrderConfirmation {
            order_id: Uuid::new_v4(),
            total: order.totals.total,
            currency: order.totals.currency,
            placed_at: chrono::Utc::now(),
        })
    }
}
