//! Allocation of discounts across an order.
//!
//! [`apply`] is the aggregation step: it takes the order and every discount
//! the caller has already validated, computes each discount's per-line
//! amounts, and stacks them. All arithmetic is in integer minor units.
//!
//! Stacking is additive with a zero floor. Each discount's base amount is
//! computed against the line's *original* subtotal, then capped at whatever
//! the line has left after earlier discounts; a line never goes negative and
//! an amount lost to the cap is forfeited rather than redistributed.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    discounts::{Discount, DiscountCode, DiscountUuid},
    orders::{LineItem, Order},
    rules::{Allocation, RuleValue},
};

/// Errors specific to discount allocation.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculate a whole percentage of an amount of minor units.
///
/// Rounds to the nearest minor unit, with ties going to the even neighbour
/// so large batches of half-cent amounts do not drift upward.
///
/// # Errors
///
/// Returns [`AllocationError::PercentConversion`] if the calculation
/// overflows or cannot be represented.
pub fn percent_of_minor(percentage: u16, minor: i64) -> Result<i64, AllocationError> {
    let percent = Percentage::from(Decimal::from(percentage) / Decimal::ONE_HUNDRED);
    let minor = Decimal::from_i64(minor).ok_or(AllocationError::PercentConversion)?;

    (percent * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(AllocationError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        .to_i64()
        .ok_or(AllocationError::PercentConversion)
}

/// One discount's contribution to one line.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountApplication<'a> {
    discount: DiscountUuid,
    code: DiscountCode,
    amount: Money<'a, Currency>,
}

impl<'a> DiscountApplication<'a> {
    /// Returns the identity of the applied discount.
    pub fn discount(&self) -> DiscountUuid {
        self.discount
    }

    /// Returns the code of the applied discount.
    pub fn code(&self) -> &DiscountCode {
        &self.code
    }

    /// Returns the amount deducted from the line.
    pub fn amount(&self) -> Money<'a, Currency> {
        self.amount
    }
}

/// One order line together with the discounts applied to it.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocatedLine<'a> {
    line: LineItem<'a>,
    discount_minor: i64,
    applications: SmallVec<[DiscountApplication<'a>; 3]>,
}

impl<'a> AllocatedLine<'a> {
    /// Returns the underlying order line.
    pub fn item(&self) -> &LineItem<'a> {
        &self.line
    }

    /// Returns the line total before discounts.
    pub fn original_total(&self) -> Money<'a, Currency> {
        self.line.subtotal()
    }

    /// Returns the sum of all discounts applied to the line.
    pub fn discount_total(&self) -> Money<'a, Currency> {
        Money::from_minor(self.discount_minor, self.line.unit_price().currency())
    }

    /// Returns the line total after discounts. Never negative.
    pub fn final_total(&self) -> Money<'a, Currency> {
        Money::from_minor(
            self.line.subtotal_minor() - self.discount_minor,
            self.line.unit_price().currency(),
        )
    }

    /// Returns each discount's contribution, in application order.
    pub fn applications(&self) -> &[DiscountApplication<'a>] {
        &self.applications
    }
}

/// An order with every validated discount allocated across its lines.
#[derive(Debug)]
pub struct AllocatedOrder<'a> {
    lines: Vec<AllocatedLine<'a>>,
    currency: &'a Currency,
}

impl<'a> AllocatedOrder<'a> {
    /// Returns the allocated lines, in input order.
    pub fn lines(&self) -> &[AllocatedLine<'a>] {
        &self.lines
    }

    /// Get the currency of the order.
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// Returns the order total before discounts.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        let minor = self
            .lines
            .iter()
            .map(|line| line.item().subtotal_minor())
            .sum();
        Money::from_minor(minor, self.currency)
    }

    /// Returns the sum of all discounts applied to the order.
    pub fn discount_total(&self) -> Money<'a, Currency> {
        let minor = self.lines.iter().map(|line| line.discount_minor).sum();
        Money::from_minor(minor, self.currency)
    }

    /// Returns the order total after discounts.
    pub fn total(&self) -> Money<'a, Currency> {
        let minor = self
            .lines
            .iter()
            .map(|line| line.item().subtotal_minor() - line.discount_minor)
            .sum();
        Money::from_minor(minor, self.currency)
    }

    /// Calculate the savings made by applying discounts.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.subtotal().sub(self.total())
    }

    /// Calculates the savings as a percentage of the pre-discount subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the savings cannot be calculated.
    pub fn savings_percent(&self) -> Result<Percentage, MoneyError> {
        let savings_minor = self.savings()?.to_minor_units();
        let subtotal_minor = self.subtotal().to_minor_units();

        if subtotal_minor == 0 {
            return Ok(Percentage::from(0.0));
        }

        let savings_dec = Decimal::from_i64(savings_minor).unwrap_or(Decimal::ZERO);
        let subtotal_dec = Decimal::from_i64(subtotal_minor).unwrap_or(Decimal::ZERO);

        Ok(Percentage::from(savings_dec / subtotal_dec))
    }
}

/// Applies validated discounts to an order, in the given order.
///
/// Every discount must already have passed [`crate::validity::validate`];
/// this step only does arithmetic. Lines that qualify for nothing come back
/// unchanged.
///
/// # Errors
///
/// Returns [`AllocationError::PercentConversion`] if percentage arithmetic
/// overflows.
pub fn apply<'a>(
    order: &Order<'a>,
    discounts: &[Discount],
) -> Result<AllocatedOrder<'a>, AllocationError> {
    let currency = order.currency();

    let mut remaining: Vec<i64> = order.iter().map(LineItem::subtotal_minor).collect();
    let mut applications: Vec<SmallVec<[DiscountApplication<'a>; 3]>> =
        (0..order.len()).map(|_| SmallVec::new()).collect();

    for discount in discounts {
        match discount.rule.value() {
            RuleValue::PercentageOff { percentage } => {
                for (index, line) in order.iter().enumerate() {
                    if !discount.rule.line_item_qualifies(line) {
                        continue;
                    }

                    let base = percent_of_minor(percentage, line.subtotal_minor())?;
                    record(discount, base, index, &mut remaining, &mut applications, currency);
                }
            }
            RuleValue::AmountOff { amount } => match discount.rule.allocation() {
                Allocation::Item => {
                    for (index, line) in order.iter().enumerate() {
                        if !discount.rule.line_item_qualifies(line) {
                            continue;
                        }

                        let base = per_item_base(amount, line);
                        record(discount, base, index, &mut remaining, &mut applications, currency);
                    }
                }
                Allocation::Total => {
                    let qualifying: Vec<(usize, i64)> = order
                        .iter()
                        .enumerate()
                        .filter(|(_, line)| discount.rule.line_item_qualifies(line))
                        .map(|(index, line)| (index, line.subtotal_minor()))
                        .collect();

                    for (index, base) in distribute(amount, &qualifying) {
                        record(discount, base, index, &mut remaining, &mut applications, currency);
                    }
                }
            },
        }
    }

    let lines = order
        .iter()
        .zip(remaining)
        .zip(applications)
        .map(|((line, rest), applications)| AllocatedLine {
            line: line.clone(),
            discount_minor: line.subtotal_minor() - rest,
            applications,
        })
        .collect();

    Ok(AllocatedOrder { lines, currency })
}

/// Caps a discount's base amount at the line's running subtotal and records
/// the application when anything is left to deduct.
fn record<'a>(
    discount: &Discount,
    base: i64,
    index: usize,
    remaining: &mut [i64],
    applications: &mut [SmallVec<[DiscountApplication<'a>; 3]>],
    currency: &'a Currency,
) {
    let Some(room) = remaining.get_mut(index) else {
        return;
    };

    let amount = base.min(*room).max(0);
    if amount == 0 {
        return;
    }

    *room -= amount;

    if let Some(slot) = applications.get_mut(index) {
        slot.push(DiscountApplication {
            discount: discount.uuid,
            code: discount.code.clone(),
            amount: Money::from_minor(amount, currency),
        });
    }
}

/// The base amount a fixed, per-item discount wants from one line: the
/// amount once per unit, but never more than the line is worth.
fn per_item_base(amount: u64, line: &LineItem<'_>) -> i64 {
    let wanted = i128::from(amount) * i128::from(line.quantity());
    let subtotal = i128::from(line.subtotal_minor());

    i64::try_from(wanted.min(subtotal)).unwrap_or(i64::MAX)
}

/// Splits a fixed, total-allocated amount across the qualifying lines in
/// proportion to their share of the qualifying subtotal.
///
/// Shares are floored; the minor units lost to flooring all go to the first
/// qualifying line so the distributed amounts sum exactly to the deduction.
/// The deduction itself never exceeds the qualifying subtotal.
fn distribute(amount: u64, qualifying: &[(usize, i64)]) -> Vec<(usize, i64)> {
    let pool: i128 = qualifying
        .iter()
        .map(|(_, subtotal)| i128::from(*subtotal))
        .sum();

    if pool <= 0 {
        return Vec::new();
    }

    let deduction = i128::from(amount).min(pool);

    let mut shares: Vec<(usize, i64)> = Vec::with_capacity(qualifying.len());
    let mut distributed: i128 = 0;

    for (index, subtotal) in qualifying {
        let share = deduction * i128::from(*subtotal) / pool;
        distributed += share;
        shares.push((*index, i64::try_from(share).unwrap_or(0)));
    }

    if let Some((_, first)) = shares.first_mut() {
        *first += i64::try_from(deduction - distributed).unwrap_or(0);
    }

    shares
}
