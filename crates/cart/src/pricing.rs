//! Derived cart totals.
//!
//! Totals are a pure function of the cart lines and the [`PricingConfig`].
//! They are recomputed on every read and never stored, so they cannot drift
//! from the lines they summarize.

use ecofinds_core::{CurrencyCode, Price};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::PricingConfig;
use crate::line::LineItem;

/// Subtotal, shipping, tax, and total for a set of lines.
///
/// All amounts are unrounded. Use [`Totals::price`] to get a displayable
/// [`Price`] rounded to two fraction digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Totals {
    /// Σ `unit_price × quantity`.
    pub subtotal: Decimal,
    /// Zero when `subtotal > free_shipping_threshold`, otherwise the flat fee.
    pub shipping: Decimal,
    /// `subtotal × tax_rate`.
    pub tax: Decimal,
    /// `subtotal + shipping + tax`.
    pub total: Decimal,
    /// Σ quantity.
    pub item_count: u64,
    /// Currency of every amount above.
    #[serde(skip)]
    pub currency: CurrencyCode,
}

impl Totals {
    /// Compute totals for the given lines.
    ///
    /// Amounts saturate at [`Decimal::MAX`] instead of panicking. The ledger
    /// only admits carts that pass [`Totals::try_compute`], so its snapshots
    /// never saturate.
    pub fn compute<'a, I>(lines: I, pricing: &PricingConfig) -> Self
    where
        I: IntoIterator<Item = &'a LineItem>,
    {
        let (subtotal, item_count) = lines
            .into_iter()
            .fold((Decimal::ZERO, 0_u64), |(sum, count), line| {
                (
                    sum.saturating_add(line.line_total()),
                    count.saturating_add(u64::from(line.quantity())),
                )
            });

        let shipping = shipping_for(subtotal, pricing);
        let tax = subtotal.saturating_mul(pricing.tax_rate);
        let total = subtotal.saturating_add(shipping).saturating_add(tax);

        Self {
            subtotal,
            shipping,
            tax,
            total,
            item_count,
            currency: pricing.currency,
        }
    }

    /// Compute totals, or `None` if any amount overflows a `Decimal`.
    pub fn try_compute<'a, I>(lines: I, pricing: &PricingConfig) -> Option<Self>
    where
        I: IntoIterator<Item = &'a LineItem>,
    {
        let mut subtotal = Decimal::ZERO;
        let mut item_count = 0_u64;
        for line in lines {
            let line_total = line
                .unit_price()
                .checked_mul(Decimal::from(line.quantity()))?;
            subtotal = subtotal.checked_add(line_total)?;
            item_count = item_count.checked_add(u64::from(line.quantity()))?;
        }

        let shipping = shipping_for(subtotal, pricing);
        let tax = subtotal.checked_mul(pricing.tax_rate)?;
        let total = subtotal.checked_add(shipping)?.checked_add(tax)?;

        Some(Self {
            subtotal,
            shipping,
            tax,
            total,
            item_count,
            currency: pricing.currency,
        })
    }

    /// Whether the shipping fee is waived.
    #[must_use]
    pub fn is_free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }

    /// Wrap an amount in this cart's currency for display.
    #[must_use]
    pub const fn price(&self, amount: Decimal) -> Price {
        Price::new(amount, self.currency)
    }

    /// Tax rounded to two fraction digits, as shown to the shopper.
    #[must_use]
    pub fn rounded_tax(&self) -> Decimal {
        self.price(self.tax).rounded()
    }

    /// Total rounded to two fraction digits, as shown to the shopper.
    #[must_use]
    pub fn rounded_total(&self) -> Decimal {
        self.price(self.total).rounded()
    }
}

fn shipping_for(subtotal: Decimal, pricing: &PricingConfig) -> Decimal {
    if subtotal > pricing.free_shipping_threshold {
        Decimal::ZERO
    } else {
        pricing.flat_shipping_fee
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ecofinds_core::ProductId;

    use super::*;

    fn item(id: i32, price: Decimal, quantity: u32) -> LineItem {
        LineItem::new(ProductId::new(id), format!("item {id}"), price, quantity).unwrap()
    }

    #[test]
    fn test_reference_cart() {
        let lines = [
            item(1, Decimal::new(199_999, 2), 2),
            item(2, Decimal::new(250_000, 2), 1),
        ];
        let totals = Totals::compute(&lines, &PricingConfig::default());

        assert_eq!(totals.subtotal, Decimal::new(649_998, 2));
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.tax, Decimal::new(11_699_964, 4));
        assert_eq!(totals.total, Decimal::new(76_699_764, 4));
        assert_eq!(totals.item_count, 3);
        assert!(totals.is_free_shipping());
    }

    #[test]
    fn test_total_is_exact_sum() {
        let lines = [
            item(1, Decimal::new(3333, 2), 7),
            item(2, Decimal::new(101, 2), 3),
        ];
        let totals = Totals::compute(&lines, &PricingConfig::default());
        assert_eq!(totals.total, totals.subtotal + totals.shipping + totals.tax);
        assert_eq!(
            totals.rounded_tax(),
            Price::new(totals.subtotal * Decimal::new(18, 2), CurrencyCode::INR).rounded()
        );
    }

    #[test]
    fn test_shipping_charged_at_threshold() {
        // Exactly at the threshold is not "above" it.
        let lines = [item(1, Decimal::from(4000), 1)];
        let totals = Totals::compute(&lines, &PricingConfig::default());
        assert_eq!(totals.shipping, Decimal::from(199));
        assert!(!totals.is_free_shipping());
    }

    #[test]
    fn test_shipping_waived_just_above_threshold() {
        let lines = [item(1, Decimal::new(400_001, 2), 1)];
        let totals = Totals::compute(&lines, &PricingConfig::default());
        assert_eq!(totals.shipping, Decimal::ZERO);
    }

    #[test]
    fn test_empty_cart() {
        let totals = Totals::compute(&Vec::<LineItem>::new(), &PricingConfig::default());
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.shipping, Decimal::from(199));
        assert_eq!(totals.total, Decimal::from(199));
        assert_eq!(totals.item_count, 0);
    }

    #[test]
    fn test_many_lines_do_not_accumulate_rounding() {
        // 1000 × 0.005 would drift to 0 or 10 if each line were rounded first.
        let lines: Vec<LineItem> = (1..=1000)
            .map(|id| item(id, Decimal::new(5, 3), 1))
            .collect();
        let totals = Totals::compute(&lines, &PricingConfig::default());
        assert_eq!(totals.subtotal, Decimal::from(5));
    }

    #[test]
    fn test_alternate_policy() {
        let pricing = PricingConfig {
            free_shipping_threshold: Decimal::from(50),
            flat_shipping_fee: Decimal::new(599, 2),
            tax_rate: Decimal::new(8, 2),
            currency: CurrencyCode::USD,
        };
        let lines = [item(1, Decimal::new(2499, 2), 1)];
        let totals = Totals::compute(&lines, &pricing);
        assert_eq!(totals.shipping, Decimal::new(599, 2));
        assert_eq!(totals.tax, Decimal::new(19_992, 4));
        assert_eq!(totals.price(totals.total).display(), "$32.98");
    }

    #[test]
    fn test_compute_is_idempotent() {
        let lines = [item(1, Decimal::new(1234, 2), 3)];
        let pricing = PricingConfig::default();
        assert_eq!(
            Totals::compute(&lines, &pricing),
            Totals::compute(&lines, &pricing)
        );
    }

    #[test]
    fn test_try_compute_matches_compute() {
        let lines = [
            item(1, Decimal::new(199_999, 2), 2),
            item(2, Decimal::new(250_000, 2), 1),
        ];
        let pricing = PricingConfig::default();
        assert_eq!(
            Totals::try_compute(&lines, &pricing),
            Some(Totals::compute(&lines, &pricing))
        );
    }

    #[test]
    fn test_overflowing_subtotal() {
        // Each line is representable, their sum is not.
        let lines = [item(1, Decimal::MAX, 1), item(2, Decimal::MAX, 1)];
        let pricing = PricingConfig::default();

        assert!(Totals::try_compute(&lines, &pricing).is_none());

        let totals = Totals::compute(&lines, &pricing);
        assert_eq!(totals.subtotal, Decimal::MAX);
        assert_eq!(totals.total, Decimal::MAX);
    }

    #[test]
    fn test_overflowing_total() {
        // The subtotal fits but adding tax pushes the total past the maximum.
        let lines = [item(1, Decimal::MAX, 1)];
        assert!(Totals::try_compute(&lines, &PricingConfig::default()).is_none());
    }
}
