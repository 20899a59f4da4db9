//! Product catalog used to add items to the cart by id.

use ecofinds_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::line::{LineItem, LineItemError};

/// Error returned when parsing an unknown [`Category`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

/// Product category, as shown in the catalog filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Kitchen,
    Clothing,
    Electronics,
    Fitness,
    Accessories,
    Beauty,
}

impl Category {
    /// Every category, in filter order.
    pub const ALL: [Self; 6] = [
        Self::Kitchen,
        Self::Clothing,
        Self::Electronics,
        Self::Fitness,
        Self::Accessories,
        Self::Beauty,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Kitchen => "Kitchen",
            Self::Clothing => "Clothing",
            Self::Electronics => "Electronics",
            Self::Fitness => "Fitness",
            Self::Accessories => "Accessories",
            Self::Beauty => "Beauty",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// A product that can be added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: Category,
    pub price: Decimal,
}

impl Product {
    fn new(id: i32, name: &str, category: Category, paise: i64) -> Self {
        Self {
            id: ProductId::new(id),
            name: name.to_string(),
            category,
            price: Decimal::new(paise, 2),
        }
    }

    /// Build a cart line for `quantity` units of this product.
    ///
    /// # Errors
    ///
    /// Returns an error if `quantity` is zero or the line total overflows.
    pub fn to_line(&self, quantity: u32) -> Result<LineItem, LineItemError> {
        LineItem::new(self.id, self.name.clone(), self.price, quantity)
    }
}

/// The set of products a shopper can browse.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// The built-in EcoFinds catalog, priced in INR.
    #[must_use]
    pub fn standard() -> Self {
        use Category::{Accessories, Beauty, Clothing, Electronics, Fitness, Kitchen};

        Self {
            products: vec![
                Product::new(1, "Bamboo Water Bottle", Kitchen, 199_999),
                Product::new(2, "Organic Cotton T-Shirt", Clothing, 256_000),
                Product::new(3, "Solar Phone Charger", Electronics, 367_999),
                Product::new(4, "Recycled Yoga Mat", Fitness, 544_000),
                Product::new(5, "Beeswax Food Wraps", Kitchen, 148_000),
                Product::new(6, "Hemp Backpack", Accessories, 719_999),
                Product::new(7, "Biodegradable Phone Case", Electronics, 239_999),
                Product::new(8, "Organic Skincare Set", Beauty, 439_999),
            ],
        }
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by id.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Products in `category` (all when `None`) whose name contains `query`,
    /// ignoring case. An empty query matches every name.
    pub fn filter<'a>(
        &'a self,
        category: Option<Category>,
        query: &str,
    ) -> impl Iterator<Item = &'a Product> + use<'a> {
        let query = query.trim().to_lowercase();
        self.products.iter().filter(move |p| {
            category.is_none_or(|c| p.category == c) && p.name.to_lowercase().contains(&query)
        })
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
