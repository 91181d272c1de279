//! Order snapshots.
//!
//! An [`Order`] is the immutable view of a cart the engine evaluates against:
//! line items with resolved product facts, unit prices in a single currency,
//! and quantities. Building one never touches a collaborator; the caller
//! resolves products and prices first.

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::catalog::{ProductFacts, ProductUuid};

/// Errors related to order construction.
#[derive(Debug, Error)]
pub enum OrderError {
    /// A line's currency differs from the order currency (index, line currency, order currency).
    #[error("Line {0} has currency {1}, but order has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// A line was not found in the order.
    #[error("Line {0} not found")]
    LineNotFound(usize),
}

/// One priced line of an order.
#[derive(Clone, Debug, PartialEq)]
pub struct LineItem<'a> {
    product: ProductUuid,
    facts: ProductFacts,
    unit_price: Money<'a, Currency>,
    quantity: u32,
}

impl<'a> LineItem<'a> {
    /// Creates a line item for a product with no type, tags, or collection.
    #[must_use]
    pub fn new(product: ProductUuid, unit_price: Money<'a, Currency>, quantity: u32) -> Self {
        Self::with_facts(product, ProductFacts::bare(), unit_price, quantity)
    }

    /// Creates a line item carrying resolved product facts.
    #[must_use]
    pub fn with_facts(
        product: ProductUuid,
        facts: ProductFacts,
        unit_price: Money<'a, Currency>,
        quantity: u32,
    ) -> Self {
        Self {
            product,
            facts,
            unit_price,
            quantity,
        }
    }

    /// Returns the product the line refers to.
    pub fn product(&self) -> ProductUuid {
        self.product
    }

    /// Returns the resolved facts for the line's product.
    pub fn facts(&self) -> &ProductFacts {
        &self.facts
    }

    /// Returns the price of a single unit.
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Returns the number of units on the line.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the undiscounted line total in minor units.
    pub fn subtotal_minor(&self) -> i64 {
        self.unit_price.to_minor_units() * i64::from(self.quantity)
    }

    /// Returns the undiscounted line total as money.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        Money::from_minor(self.subtotal_minor(), self.unit_price.currency())
    }
}

/// An order: line items sharing one currency.
#[derive(Debug)]
pub struct Order<'a> {
    lines: SmallVec<[LineItem<'a>; 8]>,
    currency: &'a Currency,
}

impl<'a> Order<'a> {
    /// Creates an order from the given lines.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::CurrencyMismatch`] when any line is priced in a
    /// currency other than the order's.
    pub fn with_lines(
        lines: impl IntoIterator<Item = LineItem<'a>>,
        currency: &'a Currency,
    ) -> Result<Self, OrderError> {
        let lines: SmallVec<[LineItem<'a>; 8]> = lines.into_iter().collect();

        lines.iter().enumerate().try_for_each(|(i, line)| {
            let line_currency = line.unit_price().currency();
            if line_currency == currency {
                Ok(())
            } else {
                Err(OrderError::CurrencyMismatch(
                    i,
                    line_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ))
            }
        })?;

        Ok(Self { lines, currency })
    }

    /// Iterate over the lines of the order.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem<'a>> {
        self.lines.iter()
    }

    /// Get a line by its index.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::LineNotFound`] if the index is out of range.
    pub fn get_line(&self, line: usize) -> Result<&LineItem<'a>, OrderError> {
        self.lines.get(line).ok_or(OrderError::LineNotFound(line))
    }

    /// Get the currency of the order.
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// Get the number of lines in the order.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the order has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the undiscounted order total in minor units.
    pub fn subtotal_minor(&self) -> i64 {
        self.lines.iter().map(LineItem::subtotal_minor).sum()
    }

    /// Returns the undiscounted order total as money.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        Money::from_minor(self.subtotal_minor(), self.currency)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;
    use uuid::Uuid;

    use super::*;

    fn line(minor: i64, quantity: u32) -> LineItem<'static> {
        LineItem::new(
            Uuid::now_v7().into(),
            Money::from_minor(minor, GBP),
            quantity,
        )
    }

    #[test]
    fn line_subtotal_multiplies_quantity() {
        let line = line(250, 3);

        assert_eq!(line.subtotal_minor(), 750);
        assert_eq!(line.subtotal(), Money::from_minor(750, GBP));
    }

    #[test]
    fn with_lines_accepts_matching_currency() -> TestResult {
        let order = Order::with_lines([line(100, 1), line(200, 2)], GBP)?;

        assert_eq!(order.len(), 2);
        assert_eq!(order.subtotal_minor(), 500);

        Ok(())
    }

    #[test]
    fn with_lines_rejects_currency_mismatch() {
        let mixed = [
            line(100, 1),
            LineItem::new(Uuid::now_v7().into(), Money::from_minor(100, USD), 1),
        ];

        let err = Order::with_lines(mixed, GBP).err();

        assert!(matches!(
            err,
            Some(OrderError::CurrencyMismatch(1, "USD", "GBP"))
        ));
    }

    #[test]
    fn get_line_missing_returns_error() -> TestResult {
        let order = Order::with_lines([line(100, 1)], GBP)?;

        let err = order.get_line(5).err();

        assert!(matches!(err, Some(OrderError::LineNotFound(5))));

        Ok(())
    }

    #[test]
    fn empty_order_subtotal_is_zero() -> TestResult {
        let order = Order::with_lines([], GBP)?;

        assert!(order.is_empty());
        assert_eq!(order.subtotal(), Money::from_minor(0, GBP));

        Ok(())
    }
}
