//! Catalog browsing command.

use ecofinds_cart::{Catalog, Category};
use ecofinds_core::{CurrencyCode, Price};
use tracing::info;

use super::print_json;

/// List catalog products, optionally narrowed by category and name.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn list(
    category: Option<Category>,
    search: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::standard();
    let products: Vec<_> = catalog.filter(category, search).collect();

    if json {
        print_json(&products)?;
        return Ok(());
    }

    if products.is_empty() {
        info!("No products found");
        return Ok(());
    }

    info!(
        "{} product(s) in {}",
        products.len(),
        category.map_or("all categories", |c| c.as_str())
    );
    for product in products {
        info!(
            "  #{} {} [{}] {}",
            product.id,
            product.name,
            product.category,
            Price::new(product.price, CurrencyCode::INR)
        );
    }
    Ok(())
}
