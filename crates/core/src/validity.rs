//! Discount applicability.
//!
//! [`validate`] answers one question: may this discount be applied in this
//! situation? The checks run in a fixed order and the first failure wins, so
//! callers always surface the most fundamental objection. The check is pure;
//! recording a redemption (and so bumping `usage_count`) is the storage
//! layer's job.

use jiff::Timestamp;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::{
    catalog::{CustomerGroupUuid, RegionUuid},
    discounts::Discount,
};

/// The situation a discount is being applied in.
#[derive(Debug, Clone)]
pub struct ApplicationContext {
    /// The instant of evaluation.
    pub now: Timestamp,
    /// The region the order is placed in.
    pub region: RegionUuid,
    /// The groups the ordering customer belongs to; empty for anonymous
    /// customers.
    pub customer_groups: FxHashSet<CustomerGroupUuid>,
}

impl ApplicationContext {
    /// Context for an anonymous customer in the given region.
    #[must_use]
    pub fn new(now: Timestamp, region: RegionUuid) -> Self {
        Self {
            now,
            region,
            customer_groups: FxHashSet::default(),
        }
    }

    /// Attaches the customer's group memberships.
    #[must_use]
    pub fn with_customer_groups(
        mut self,
        groups: impl IntoIterator<Item = CustomerGroupUuid>,
    ) -> Self {
        self.customer_groups = groups.into_iter().collect();
        self
    }
}

/// Why a well-formed discount cannot be applied right now.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountStateError {
    /// The discount has been switched off.
    #[error("The discount code is disabled")]
    Disabled,

    /// The activity window has not opened yet.
    #[error("Discount is not valid yet")]
    NotStarted,

    /// The activity window has closed.
    #[error("Discount is expired")]
    Expired,

    /// The discount is restricted to regions the order is not in.
    #[error("The discount is not available in current region")]
    RegionMismatch,

    /// Every allowed redemption has been recorded.
    #[error("Discount has been used maximum allowed times")]
    UsageLimitExceeded,

    /// The customer's group memberships do not satisfy the rule.
    #[error("Discount is not valid for customer")]
    ConditionMismatch,
}

/// Checks whether a discount may be applied in the given context.
///
/// Checks run in order: disabled, not started, expired, region, usage
/// limit, customer conditions. Both window bounds are inclusive: a discount
/// is applicable at exactly `starts_at` and at exactly `ends_at`.
///
/// # Errors
///
/// Returns the first failing [`DiscountStateError`].
pub fn validate(discount: &Discount, ctx: &ApplicationContext) -> Result<(), DiscountStateError> {
    if discount.is_disabled {
        return Err(DiscountStateError::Disabled);
    }

    if let Some(starts_at) = discount.starts_at
        && ctx.now < starts_at
    {
        return Err(DiscountStateError::NotStarted);
    }

    if let Some(ends_at) = discount.ends_at
        && ctx.now > ends_at
    {
        return Err(DiscountStateError::Expired);
    }

    if !discount.regions.is_empty() && !discount.regions.contains(&ctx.region) {
        return Err(DiscountStateError::RegionMismatch);
    }

    if let Some(limit) = discount.usage_limit
        && discount.usage_count >= limit
    {
        return Err(DiscountStateError::UsageLimitExceeded);
    }

    if !discount.rule.customer_qualifies(&ctx.customer_groups) {
        return Err(DiscountStateError::ConditionMismatch);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;
    use uuid::Uuid;

    use crate::{
        conditions::{ConditionOperator, ConditionScope, DiscountCondition},
        discounts::DiscountCode,
        rules::{Allocation, DiscountRule, RuleValue},
    };

    use super::*;

    fn discount() -> TestResult<Discount> {
        let rule = DiscountRule::new(
            "10% off everything",
            RuleValue::PercentageOff { percentage: 10 },
            Allocation::Total,
            vec![],
        )?;

        Ok(Discount::new(DiscountCode::new("TEST10")?, rule))
    }

    fn context() -> TestResult<ApplicationContext> {
        Ok(ApplicationContext::new(
            "2026-06-15T12:00:00Z".parse()?,
            Uuid::now_v7().into(),
        ))
    }

    #[test]
    fn enabled_unrestricted_discount_validates() -> TestResult {
        validate(&discount()?, &context()?)?;

        Ok(())
    }

    #[test]
    fn disabled_wins_over_everything() -> TestResult {
        let mut discount = discount()?;
        discount.is_disabled = true;
        discount.ends_at = Some("2020-01-01T00:00:00Z".parse()?);

        let err = validate(&discount, &context()?).err();

        assert_eq!(err, Some(DiscountStateError::Disabled));

        Ok(())
    }

    #[test]
    fn future_start_is_not_yet_valid() -> TestResult {
        let mut discount = discount()?;
        discount.starts_at = Some("2027-01-01T00:00:00Z".parse()?);

        let err = validate(&discount, &context()?).err();

        assert_eq!(err, Some(DiscountStateError::NotStarted));

        Ok(())
    }

    #[test]
    fn window_bounds_are_inclusive() -> TestResult {
        let mut discount = discount()?;
        let mut ctx = context()?;
        discount.starts_at = Some(ctx.now);
        discount.ends_at = Some(ctx.now);

        validate(&discount, &ctx)?;

        ctx.now = ctx.now.checked_add(jiff::Span::new().seconds(1))?;
        let err = validate(&discount, &ctx).err();
        assert_eq!(err, Some(DiscountStateError::Expired));

        Ok(())
    }

    #[test]
    fn expiry_wins_over_region_mismatch() -> TestResult {
        let mut discount = discount()?;
        discount.ends_at = Some("2020-01-01T00:00:00Z".parse()?);
        discount.regions = [RegionUuid::from_uuid(Uuid::now_v7())].into_iter().collect();

        let err = validate(&discount, &context()?).err();

        assert_eq!(err, Some(DiscountStateError::Expired));

        Ok(())
    }

    #[test]
    fn region_restricted_discount_requires_listed_region() -> TestResult {
        let eu: RegionUuid = Uuid::now_v7().into();
        let us: RegionUuid = Uuid::now_v7().into();
        let mut discount = discount()?;
        discount.regions = [eu].into_iter().collect();

        let mut ctx = context()?;
        ctx.region = us;
        assert_eq!(
            validate(&discount, &ctx).err(),
            Some(DiscountStateError::RegionMismatch)
        );

        ctx.region = eu;
        validate(&discount, &ctx)?;

        Ok(())
    }

    #[test]
    fn empty_region_set_applies_anywhere() -> TestResult {
        let discount = discount()?;

        validate(&discount, &context()?)?;

        Ok(())
    }

    #[test]
    fn usage_limit_boundary_is_exclusive() -> TestResult {
        let mut discount = discount()?;
        discount.usage_limit = Some(10);
        discount.usage_count = 9;

        validate(&discount, &context()?)?;

        discount.usage_count = 10;
        let err = validate(&discount, &context()?).err();
        assert_eq!(err, Some(DiscountStateError::UsageLimitExceeded));

        Ok(())
    }

    #[test]
    fn customer_group_gate_rejects_outsiders() -> TestResult {
        let vip: CustomerGroupUuid = Uuid::now_v7().into();
        let rule = DiscountRule::new(
            "10% off for VIPs",
            RuleValue::PercentageOff { percentage: 10 },
            Allocation::Total,
            vec![DiscountCondition::new(
                ConditionOperator::In,
                ConditionScope::CustomerGroups([vip].into_iter().collect()),
            )],
        )?;
        let discount = Discount::new(DiscountCode::new("VIP10")?, rule);

        let anonymous = context()?;
        assert_eq!(
            validate(&discount, &anonymous).err(),
            Some(DiscountStateError::ConditionMismatch)
        );

        let member = context()?.with_customer_groups([vip]);
        validate(&discount, &member)?;

        Ok(())
    }
}
