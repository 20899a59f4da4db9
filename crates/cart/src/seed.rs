//! Seed carts.
//!
//! There is no persisted cart; a ledger starts from a fixed set of lines.
//! [`demo_items`] is the storefront's demo cart and [`load_seed`] reads an
//! alternative fixture from a JSON file.

use std::path::Path;

use ecofinds_core::ProductId;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;

use crate::line::{LineItem, LineItemError};

/// Errors that can occur while loading a seed file.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid seed file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid demo item: {0}")]
    Item(#[from] LineItemError),
}

/// The demo cart: three eco products, four units in total.
///
/// # Errors
///
/// Never fails in practice; the error path exists because every
/// [`LineItem`] is validated on construction.
pub fn demo_items() -> Result<Vec<LineItem>, SeedError> {
    Ok(vec![
        LineItem::new(
            ProductId::new(1),
            "Bamboo Water Bottle",
            Decimal::new(199_999, 2),
            2,
        )?,
        LineItem::new(
            ProductId::new(2),
            "Organic Cotton T-Shirt",
            Decimal::new(256_000, 2),
            1,
        )?,
        LineItem::new(
            ProductId::new(3),
            "Solar Phone Charger",
            Decimal::new(367_999, 2),
            1,
        )?,
    ])
}

/// Load seed lines from a JSON array of `{id, name, unit_price, quantity}`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid JSON, or
/// contains a line with zero quantity or a negative price.
pub async fn load_seed(path: &Path) -> Result<Vec<LineItem>, SeedError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Io {
            path: path.display().to_string(),
            source,
        })?;

    let items = parse_seed(&content).map_err(|source| SeedError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    info!(path = %path.display(), lines = items.len(), "Loaded seed cart");
    Ok(items)
}

/// Parse seed lines from JSON text.
///
/// # Errors
///
/// Returns an error if the text is not a valid seed array.
pub fn parse_seed(content: &str) -> Result<Vec<LineItem>, serde_json::Error> {
    serde_json::from_str(content)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::PricingConfig;
    use crate::pricing::Totals;

    #[test]
    fn test_demo_items() {
        let items = demo_items().unwrap();
        assert_eq!(items.len(), 3);

        let totals = Totals::compute(&items, &PricingConfig::default());
        assert_eq!(totals.subtotal, Decimal::new(1_023_997, 2));
        assert_eq!(totals.item_count, 4);
        assert!(totals.is_free_shipping());
    }

    #[test]
    fn test_parse_seed() {
        let items = parse_seed(
            r#"[
                {"id": 7, "name": "Jute Tote", "unit_price": "349.50", "quantity": 2},
                {"id": 8, "name": "Beeswax Wraps", "unit_price": 120, "quantity": 1}
            ]"#,
        )
        .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items.first().unwrap().name(), "Jute Tote");
        assert_eq!(items.last().unwrap().unit_price(), Decimal::from(120));
    }

    #[test]
    fn test_parse_seed_rejects_zero_quantity() {
        let result = parse_seed(r#"[{"id": 1, "name": "x", "unit_price": "1", "quantity": 0}]"#);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_load_seed_missing_file() {
        let err = load_seed(Path::new("/nonexistent/seed.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, SeedError::Io { .. }));
    }

    #[tokio::test]
    async fn test_load_seed_from_file() {
        let path =
            std::env::temp_dir().join(format!("ecofinds-seed-{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(
            &path,
            r#"[{"id": 4, "name": "Recycled Yoga Mat", "unit_price": "5440.00", "quantity": 1}]"#,
        )
        .await
        .unwrap();

        let items = load_seed(&path).await;
        tokio::fs::remove_file(&path).await.unwrap();

        let items = items.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items.first().unwrap().id(), ProductId::new(4));
    }

    #[test]
    fn test_parse_seed_rejects_overflowing_line() {
        let result = parse_seed(
            r#"[{"id": 1, "name": "x", "unit_price": "79228162514264337593543950335", "quantity": 2}]"#,
        );
        assert!(result.is_err());
    }
}
