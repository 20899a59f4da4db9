//! Cart error types.
//!
//! Not every [`CartError`] is a failure the shopper should see. Rejected
//! quantities, rows that disappeared under a concurrent removal, and
//! double submits on a busy row leave the ledger untouched and are reported
//! as benign (see [`CartError::is_benign`]). Only backend failures carry a
//! message worth rendering inline on the affected row.

use ecofinds_core::{LineStatus, ProductId};
use thiserror::Error;

use crate::backend::BackendError;

/// Errors returned by cart ledger operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested quantity is below the floor of 1, does not fit a `u32`, or
    /// would push the cart amounts out of range.
    #[error("invalid quantity: {requested}")]
    InvalidQuantity {
        /// The rejected quantity.
        requested: i64,
    },

    /// No line with this id is in the cart.
    #[error("item not found: {0}")]
    ItemNotFound(ProductId),

    /// Another mutation for this row is still in flight.
    #[error("item {id} is busy ({status})")]
    RowBusy {
        /// The busy row.
        id: ProductId,
        /// What the row is currently doing.
        status: LineStatus,
    },

    /// The backend rejected or failed the mutation.
    #[error("backend error for item {id}: {source}")]
    Backend {
        /// The row the mutation targeted.
        id: ProductId,
        /// Underlying backend failure.
        #[source]
        source: BackendError,
    },

    /// Admitting the line would push a cart amount past what a `Decimal`
    /// can hold.
    #[error("amounts for item {id} exceed the supported range")]
    AmountOverflow {
        /// The line that was refused.
        id: ProductId,
    },
}

impl CartError {
    /// Whether the error is a local no-op that should not be surfaced.
    #[must_use]
    pub const fn is_benign(&self) -> bool {
        matches!(
            self,
            Self::InvalidQuantity { .. } | Self::ItemNotFound(_) | Self::RowBusy { .. }
        )
    }

    /// The row the error concerns, if any.
    #[must_use]
    pub const fn item_id(&self) -> Option<ProductId> {
        match self {
            Self::InvalidQuantity { .. } => None,
            Self::ItemNotFound(id)
            | Self::RowBusy { id, .. }
            | Self::Backend { id, .. }
            | Self::AmountOverflow { id } => Some(*id),
        }
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        let err = CartError::InvalidQuantity { requested: -1 };
        assert_eq!(err.to_string(), "invalid quantity: -1");

        let err = CartError::ItemNotFound(ProductId::new(9));
        assert_eq!(err.to_string(), "item not found: 9");

        let err = CartError::RowBusy {
            id: ProductId::new(2),
            status: LineStatus::RemovalPending,
        };
        assert_eq!(err.to_string(), "item 2 is busy (removal_pending)");
    }

    #[test]
    fn test_benign_classification() {
        assert!(CartError::InvalidQuantity { requested: 0 }.is_benign());
        assert!(CartError::ItemNotFound(ProductId::new(1)).is_benign());
        assert!(
            CartError::RowBusy {
                id: ProductId::new(1),
                status: LineStatus::QuantityPending,
            }
            .is_benign()
        );

        let backend = CartError::Backend {
            id: ProductId::new(1),
            source: BackendError::Unavailable("timeout".to_string()),
        };
        assert!(!backend.is_benign());
        assert_eq!(backend.item_id(), Some(ProductId::new(1)));

        let overflow = CartError::AmountOverflow {
            id: ProductId::new(4),
        };
        assert!(!overflow.is_benign());
        assert_eq!(overflow.item_id(), Some(ProductId::new(4)));
    }

    #[test]
    fn test_invalid_quantity_has_no_row() {
        assert_eq!(CartError::InvalidQuantity { requested: 0 }.item_id(), None);
    }
}
