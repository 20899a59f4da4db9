//! The cart ledger.
//!
//! [`CartLedger`] owns the ordered cart lines together with a per-row
//! [`LineStatus`]. Mutations follow the same shape:
//!
//! 1. Under the write lock, check the row is idle and mark it pending.
//! 2. Release the lock and await the backend round trip, which runs on its
//!    own task so an abandoned caller cannot strand the row.
//! 3. Under the write lock again, clear the pending status and apply the
//!    change (or record the failure on the row).
//!
//! The lock is never held across a backend call, so edits to different rows
//! run concurrently, while a second edit to a busy row is rejected with
//! [`CartError::RowBusy`]. Every state change is published on a
//! [`tokio::sync::watch`] channel for presentation layers to render.

use std::sync::Arc;

use ecofinds_core::{LineStatus, ProductId};
use serde::Serialize;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, instrument, warn};

use crate::backend::{BackendError, CartBackend};
use crate::config::PricingConfig;
use crate::error::{CartError, Result};
use crate::line::LineItem;
use crate::pricing::Totals;

// =============================================================================
// Snapshots
// =============================================================================

/// A cart line as seen by readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineSnapshot {
    pub item: LineItem,
    pub status: LineStatus,
    /// Inline error from the last failed mutation, if any.
    pub error: Option<String>,
}

/// Point-in-time view of the whole cart with derived totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSnapshot {
    pub lines: Vec<LineSnapshot>,
    pub totals: Totals,
}

impl CartSnapshot {
    /// Look up a line by product id.
    #[must_use]
    pub fn line(&self, id: ProductId) -> Option<&LineSnapshot> {
        self.lines.iter().find(|line| line.item.id() == id)
    }

    /// Status of a row, or `None` if it is not in the cart.
    #[must_use]
    pub fn status_of(&self, id: ProductId) -> Option<LineStatus> {
        self.line(id).map(|line| line.status)
    }

    /// Rows with a quantity change in flight.
    #[must_use]
    pub fn pending_quantity_ids(&self) -> Vec<ProductId> {
        self.ids_with(LineStatus::QuantityPending)
    }

    /// Rows with a removal in flight.
    #[must_use]
    pub fn pending_removal_ids(&self) -> Vec<ProductId> {
        self.ids_with(LineStatus::RemovalPending)
    }

    /// Whether any row has a mutation in flight.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.lines.iter().any(|line| line.status.is_pending())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    fn ids_with(&self, status: LineStatus) -> Vec<ProductId> {
        self.lines
            .iter()
            .filter(|line| line.status == status)
            .map(|line| line.item.id())
            .collect()
    }
}

// =============================================================================
// Ledger
// =============================================================================

struct Row {
    item: LineItem,
    status: LineStatus,
    error: Option<String>,
}

impl Row {
    const fn new(item: LineItem) -> Self {
        Self {
            item,
            status: LineStatus::Idle,
            error: None,
        }
    }
}

/// The rows behind the lock.
///
/// Every committed state has totals that [`Totals::try_compute`] accepts;
/// each mutation checks its candidate line before writing it.
struct LedgerState {
    rows: Vec<Row>,
}

impl LedgerState {
    /// Build rows from seed lines, merging repeated ids into the first occurrence.
    fn from_seed(
        seed: impl IntoIterator<Item = LineItem>,
        pricing: &PricingConfig,
    ) -> Result<Self> {
        let mut state = Self { rows: Vec::new() };
        for item in seed {
            state.add(item, pricing)?;
        }
        Ok(state)
    }

    fn row(&self, id: ProductId) -> Option<&Row> {
        self.rows.iter().find(|row| row.item.id() == id)
    }

    fn row_mut(&mut self, id: ProductId) -> Option<&mut Row> {
        self.rows.iter_mut().find(|row| row.item.id() == id)
    }

    /// Totals as they would be with `candidate` replacing (or appended as)
    /// the line with its id, or `None` on overflow.
    fn totals_with(&self, candidate: &LineItem, pricing: &PricingConfig) -> Option<Totals> {
        let id = candidate.id();
        let lines = self
            .rows
            .iter()
            .map(|row| if row.item.id() == id { candidate } else { &row.item });

        if self.row(id).is_some() {
            Totals::try_compute(lines, pricing)
        } else {
            Totals::try_compute(lines.chain(std::iter::once(candidate)), pricing)
        }
    }

    /// The row's line resized to `quantity`, if the cart can hold it.
    fn resized(&self, id: ProductId, quantity: u32, pricing: &PricingConfig) -> Result<LineItem> {
        let row = self.row(id).ok_or(CartError::ItemNotFound(id))?;
        let rejected = || CartError::InvalidQuantity {
            requested: i64::from(quantity),
        };
        let item = row.item.with_quantity(quantity).map_err(|_| rejected())?;
        self.totals_with(&item, pricing).ok_or_else(rejected)?;
        Ok(item)
    }

    /// Mark an idle row as pending, checking a requested quantity up front.
    fn begin(
        &mut self,
        id: ProductId,
        pending: LineStatus,
        quantity: Option<u32>,
        pricing: &PricingConfig,
    ) -> Result<()> {
        let status = self.row(id).ok_or(CartError::ItemNotFound(id))?.status;
        if !status.is_idle() {
            return Err(CartError::RowBusy { id, status });
        }
        if let Some(quantity) = quantity {
            self.resized(id, quantity, pricing)?;
        }
        if let Some(row) = self.row_mut(id) {
            row.status = pending;
            row.error = None;
        }
        Ok(())
    }

    /// Apply a confirmed quantity change and return the row to idle.
    fn apply_quantity(
        &mut self,
        id: ProductId,
        quantity: u32,
        pricing: &PricingConfig,
    ) -> Result<()> {
        // Other rows may have changed during the round trip.
        let resized = self.resized(id, quantity, pricing);
        let row = self.row_mut(id).ok_or(CartError::ItemNotFound(id))?;
        row.status = LineStatus::Idle;
        row.item = resized?;
        row.error = None;
        Ok(())
    }

    /// Return a row to idle with the failure shown inline.
    fn fail(&mut self, id: ProductId, source: BackendError) -> CartError {
        let Some(row) = self.row_mut(id) else {
            return CartError::ItemNotFound(id);
        };
        row.status = LineStatus::Idle;
        row.error = Some(source.to_string());
        CartError::Backend { id, source }
    }

    /// Append a line, or grow an idle line with the same id. Returns the
    /// line's resulting quantity.
    fn add(&mut self, item: LineItem, pricing: &PricingConfig) -> Result<u32> {
        let id = item.id();
        let overflow = || CartError::AmountOverflow { id };

        let candidate = match self.row(id) {
            Some(row) if !row.status.is_idle() => {
                return Err(CartError::RowBusy {
                    id,
                    status: row.status,
                });
            }
            Some(row) => {
                if row.item.unit_price() != item.unit_price() || row.item.name() != item.name() {
                    warn!(
                        item = %id,
                        kept_name = row.item.name(),
                        kept_price = %row.item.unit_price(),
                        dropped_name = item.name(),
                        dropped_price = %item.unit_price(),
                        "merging lines with different details, keeping the existing line"
                    );
                }
                let merged = row
                    .item
                    .quantity()
                    .checked_add(item.quantity())
                    .ok_or_else(overflow)?;
                row.item.with_quantity(merged).map_err(|_| overflow())?
            }
            None => item,
        };
        self.totals_with(&candidate, pricing).ok_or_else(overflow)?;

        let quantity = candidate.quantity();
        match self.row_mut(id) {
            Some(row) => {
                row.item = candidate;
                row.error = None;
            }
            None => self.rows.push(Row::new(candidate)),
        }
        Ok(quantity)
    }

    fn snapshot(&self, pricing: &PricingConfig) -> CartSnapshot {
        CartSnapshot {
            lines: self
                .rows
                .iter()
                .map(|row| LineSnapshot {
                    item: row.item.clone(),
                    status: row.status,
                    error: row.error.clone(),
                })
                .collect(),
            totals: Totals::compute(self.rows.iter().map(|row| &row.item), pricing),
        }
    }
}

/// Shared, cheaply cloneable handle to one shopper's cart.
///
/// Clones refer to the same cart, so a handle can be moved into each task
/// that mutates it.
pub struct CartLedger<B> {
    inner: Arc<LedgerInner<B>>,
}

struct LedgerInner<B> {
    state: RwLock<LedgerState>,
    backend: B,
    pricing: PricingConfig,
    updates: watch::Sender<CartSnapshot>,
}

impl<B> Clone for CartLedger<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: CartBackend> CartLedger<B> {
    /// Create a ledger seeded with `seed`.
    ///
    /// Seed lines sharing an id are merged so the cart never holds two lines
    /// for the same product; the first line's name and price are kept.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AmountOverflow`] if the seed quantities or
    /// amounts exceed the supported range.
    pub fn new(
        seed: impl IntoIterator<Item = LineItem>,
        pricing: PricingConfig,
        backend: B,
    ) -> Result<Self> {
        let state = LedgerState::from_seed(seed, &pricing)?;
        let (updates, _) = watch::channel(state.snapshot(&pricing));

        Ok(Self {
            inner: Arc::new(LedgerInner {
                state: RwLock::new(state),
                backend,
                pricing,
                updates,
            }),
        })
    }

    /// Current cart state with freshly derived totals.
    pub async fn snapshot(&self) -> CartSnapshot {
        self.inner.state.read().await.snapshot(&self.inner.pricing)
    }

    /// Receive every state change, including pending transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.inner.updates.subscribe()
    }

    /// Pricing policy the totals are derived with.
    #[must_use]
    pub fn pricing(&self) -> &PricingConfig {
        &self.inner.pricing
    }

    /// Backend the ledger round-trips through.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    /// Change the quantity of a line.
    ///
    /// The row reports [`LineStatus::QuantityPending`] until the backend
    /// answers, then the new quantity is applied and the row returns to idle.
    /// The round trip runs on its own task, so dropping the returned future
    /// does not leave the row pending.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`] if `new_quantity < 1` or the cart
    ///   amounts would overflow; nothing changes.
    /// - [`CartError::ItemNotFound`] if the line is not (or no longer) in the cart.
    /// - [`CartError::RowBusy`] if another mutation for the row is in flight.
    /// - [`CartError::Backend`] if the round trip failed; the row is idle again,
    ///   keeps its old quantity, and carries the error message.
    #[instrument(skip(self), fields(item = %id))]
    pub async fn update_quantity(&self, id: ProductId, new_quantity: i64) -> Result<CartSnapshot> {
        let quantity = match u32::try_from(new_quantity) {
            Ok(quantity) if quantity >= 1 => quantity,
            _ => {
                debug!(new_quantity, "ignoring quantity below floor");
                return Err(CartError::InvalidQuantity {
                    requested: new_quantity,
                });
            }
        };

        self.begin(id, LineStatus::QuantityPending, Some(quantity))
            .await?;
        debug!(quantity, "quantity update pending");

        let ledger = self.clone();
        let round_trip = tokio::spawn(
            async move { ledger.settle_quantity(id, quantity).await }.in_current_span(),
        );
        self.join(id, round_trip).await
    }

    /// Remove a line from the cart.
    ///
    /// The row reports [`LineStatus::RemovalPending`] until the backend
    /// answers, then it is deleted. Other lines keep their order, prices,
    /// and quantities. Like [`CartLedger::update_quantity`], the round trip
    /// completes even if the caller stops waiting.
    ///
    /// # Errors
    ///
    /// - [`CartError::ItemNotFound`] if the line is not in the cart.
    /// - [`CartError::RowBusy`] if another mutation for the row is in flight,
    ///   including a removal already under way.
    /// - [`CartError::Backend`] if the round trip failed; the row stays in the
    ///   cart, idle, with the error message attached.
    #[instrument(skip(self), fields(item = %id))]
    pub async fn remove_item(&self, id: ProductId) -> Result<CartSnapshot> {
        self.begin(id, LineStatus::RemovalPending, None).await?;
        debug!("removal pending");

        let ledger = self.clone();
        let round_trip =
            tokio::spawn(async move { ledger.settle_removal(id).await }.in_current_span());
        self.join(id, round_trip).await
    }

    /// Add a product to the cart.
    ///
    /// A new product is appended; an existing idle line has its quantity
    /// increased instead, so ids stay unique.
    ///
    /// # Errors
    ///
    /// - [`CartError::RowBusy`] if the product's line has a mutation in flight.
    /// - [`CartError::AmountOverflow`] if the merged quantity or the cart
    ///   amounts would overflow; nothing changes.
    #[instrument(skip(self, item), fields(item = %item.id(), quantity = item.quantity()))]
    pub async fn add_item(&self, item: LineItem) -> Result<CartSnapshot> {
        let mut state = self.inner.state.write().await;

        match state.add(item, &self.inner.pricing) {
            Ok(quantity) => {
                info!(quantity, "item added");
                Ok(self.publish(&state))
            }
            Err(e) => {
                drop(state);
                log_failure(&e);
                Err(e)
            }
        }
    }

    /// Dismiss the inline error shown on a row.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if the line is not in the cart.
    pub async fn clear_error(&self, id: ProductId) -> Result<CartSnapshot> {
        let mut state = self.inner.state.write().await;
        let row = state.row_mut(id).ok_or(CartError::ItemNotFound(id))?;
        row.error = None;
        Ok(self.publish(&state))
    }

    /// Mark an idle row as pending.
    async fn begin(&self, id: ProductId, pending: LineStatus, quantity: Option<u32>) -> Result<()> {
        let mut state = self.inner.state.write().await;

        match state.begin(id, pending, quantity, &self.inner.pricing) {
            Ok(()) => {
                self.publish(&state);
                Ok(())
            }
            Err(e) => {
                drop(state);
                log_failure(&e);
                Err(e)
            }
        }
    }

    /// Backend round trip and commit for a quantity change.
    async fn settle_quantity(self, id: ProductId, quantity: u32) -> Result<CartSnapshot> {
        let outcome = self.inner.backend.update_quantity(id, quantity).await;

        let mut state = self.inner.state.write().await;
        let result = match outcome {
            Ok(()) => state.apply_quantity(id, quantity, &self.inner.pricing),
            Err(source) => Err(state.fail(id, source)),
        };
        let snapshot = self.publish(&state);
        drop(state);

        result.map(|()| {
            info!(quantity, "quantity updated");
            snapshot
        })
    }

    /// Backend round trip and commit for a removal.
    async fn settle_removal(self, id: ProductId) -> Result<CartSnapshot> {
        let outcome = self.inner.backend.remove_line(id).await;

        let mut state = self.inner.state.write().await;
        let result = match outcome {
            Ok(()) => {
                let before = state.rows.len();
                state.rows.retain(|row| row.item.id() != id);
                if state.rows.len() == before {
                    Err(CartError::ItemNotFound(id))
                } else {
                    Ok(())
                }
            }
            Err(source) => Err(state.fail(id, source)),
        };
        let snapshot = self.publish(&state);
        drop(state);

        result.map(|()| {
            info!(remaining = snapshot.len(), "item removed");
            snapshot
        })
    }

    /// Await a round trip task, returning the row to idle if the task died.
    async fn join(
        &self,
        id: ProductId,
        task: JoinHandle<Result<CartSnapshot>>,
    ) -> Result<CartSnapshot> {
        let result = match task.await {
            Ok(result) => result,
            Err(e) => {
                let source = BackendError::Unavailable(format!("round trip aborted: {e}"));
                let mut state = self.inner.state.write().await;
                let error = state.fail(id, source);
                self.publish(&state);
                Err(error)
            }
        };

        if let Err(e) = &result {
            log_failure(e);
        }
        result
    }

    /// Broadcast the current state and return it.
    fn publish(&self, state: &LedgerState) -> CartSnapshot {
        let snapshot = state.snapshot(&self.inner.pricing);
        self.inner.updates.send_replace(snapshot.clone());
        snapshot
    }
}

fn log_failure(error: &CartError) {
    if error.is_benign() {
        debug!(%error, "mutation skipped");
    } else {
        warn!(%error, "mutation failed");
    }
}
