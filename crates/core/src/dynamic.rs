//! Dynamic discount codes.
//!
//! A dynamic discount is a template: it is never redeemed under its own
//! code, it mints child codes instead. A child inherits the parent's rule
//! and region set but carries its own code, usage counters, and expiry. A
//! parent's `valid_duration` is resolved to an absolute `ends_at` at mint
//! time; afterwards the child lives independently, so expiring or disabling
//! the parent does not revoke codes already handed out.

use jiff::{Span, Timestamp, tz::TimeZone};
use thiserror::Error;
use uuid::Uuid;

use crate::discounts::{Discount, DiscountCode};

/// Errors raised while minting a child code.
#[derive(Debug, Error)]
pub enum DynamicCodeError {
    /// The named discount is not dynamic, so it cannot mint child codes.
    #[error("Discount {code} is not dynamic; only dynamic discounts can mint child codes")]
    InvalidParent {
        /// The code of the would-be parent.
        code: DiscountCode,
    },

    /// Resolving the parent's duration to an absolute expiry failed.
    #[error(transparent)]
    Expiry(#[from] jiff::Error),
}

/// Mints a child discount from a dynamic parent.
///
/// The child starts with zero usage and a usage limit of one unless the
/// caller asks for more. When the parent carries a `valid_duration`, the
/// child's `ends_at` is `now` plus that duration; otherwise the child never
/// expires on its own.
///
/// # Errors
///
/// Returns [`DynamicCodeError::InvalidParent`] when the parent is not
/// dynamic, or [`DynamicCodeError::Expiry`] when the expiry arithmetic
/// overflows the representable time range.
pub fn derive_child(
    parent: &Discount,
    code: DiscountCode,
    usage_limit: Option<u64>,
    now: Timestamp,
) -> Result<Discount, DynamicCodeError> {
    if !parent.is_dynamic {
        return Err(DynamicCodeError::InvalidParent {
            code: parent.code.clone(),
        });
    }

    let ends_at = parent
        .valid_duration
        .map(|duration| expiry_after(now, duration))
        .transpose()?;

    Ok(Discount {
        uuid: Uuid::now_v7().into(),
        code,
        rule: parent.rule.clone(),
        is_dynamic: true,
        is_disabled: false,
        valid_duration: None,
        starts_at: None,
        ends_at,
        usage_limit: usage_limit.or(Some(1)),
        usage_count: 0,
        regions: parent.regions.clone(),
        parent: Some(parent.uuid),
    })
}

/// Adds a duration to an instant using calendar arithmetic in UTC.
///
/// Calendar units need a date to be meaningful: `P2Y` from any instant lands
/// on the same civil date two years later, with end-of-month days clamped.
///
/// # Errors
///
/// Returns an error when the result falls outside the representable time
/// range.
pub fn expiry_after(now: Timestamp, duration: Span) -> Result<Timestamp, jiff::Error> {
    Ok(now
        .to_zoned(TimeZone::UTC)
        .checked_add(duration)?
        .timestamp())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::rules::{Allocation, DiscountRule, RuleValue};

    use super::*;

    fn dynamic_parent() -> TestResult<Discount> {
        let rule = DiscountRule::new(
            "dynamic 15% off",
            RuleValue::PercentageOff { percentage: 15 },
            Allocation::Total,
            vec![],
        )?;

        let mut parent = Discount::new(DiscountCode::new("WINTERSALE")?, rule);
        parent.is_dynamic = true;

        Ok(parent)
    }

    #[test]
    fn non_dynamic_parent_is_rejected() -> TestResult {
        let rule = DiscountRule::new(
            "plain 10% off",
            RuleValue::PercentageOff { percentage: 10 },
            Allocation::Total,
            vec![],
        )?;
        let parent = Discount::new(DiscountCode::new("PLAIN10")?, rule);

        let err = derive_child(
            &parent,
            DiscountCode::new("CHILD1")?,
            None,
            Timestamp::now(),
        )
        .err();

        assert!(matches!(
            err,
            Some(DynamicCodeError::InvalidParent { code }) if code.as_str() == "PLAIN10"
        ));

        Ok(())
    }

    #[test]
    fn two_year_duration_lands_two_civil_years_later() -> TestResult {
        let mut parent = dynamic_parent()?;
        parent.valid_duration = Some("P2Y".parse()?);

        let now: Timestamp = "2026-08-25T10:30:00Z".parse()?;
        let child = derive_child(&parent, DiscountCode::new("HOLIDAY24")?, None, now)?;

        assert_eq!(child.ends_at, Some("2028-08-25T10:30:00Z".parse()?));

        Ok(())
    }

    #[test]
    fn leap_day_expiry_clamps_to_month_end() -> TestResult {
        let mut parent = dynamic_parent()?;
        parent.valid_duration = Some("P2Y".parse()?);

        let now: Timestamp = "2024-02-29T00:00:00Z".parse()?;
        let child = derive_child(&parent, DiscountCode::new("LEAP")?, None, now)?;

        assert_eq!(child.ends_at, Some("2026-02-28T00:00:00Z".parse()?));

        Ok(())
    }

    #[test]
    fn parent_without_duration_mints_non_expiring_children() -> TestResult {
        let parent = dynamic_parent()?;

        let child = derive_child(&parent, DiscountCode::new("FOREVER")?, None, Timestamp::now())?;

        assert_eq!(child.ends_at, None);

        Ok(())
    }

    #[test]
    fn child_inherits_rule_and_regions_with_fresh_counters() -> TestResult {
        let eu = uuid::Uuid::now_v7().into();
        let mut parent = dynamic_parent()?;
        parent.regions = [eu].into_iter().collect();
        parent.usage_count = 42;
        parent.usage_limit = Some(1000);

        let child = derive_child(&parent, DiscountCode::new("child1")?, None, Timestamp::now())?;

        assert_eq!(child.code.as_str(), "CHILD1");
        assert_eq!(child.rule.uuid(), parent.rule.uuid());
        assert_eq!(child.regions, parent.regions);
        assert_eq!(child.parent, Some(parent.uuid));
        assert_eq!(child.usage_count, 0);
        assert_eq!(child.usage_limit, Some(1));
        assert!(child.is_dynamic);
        assert!(!child.is_disabled);

        Ok(())
    }

    #[test]
    fn caller_can_raise_the_child_usage_limit() -> TestResult {
        let parent = dynamic_parent()?;

        let child = derive_child(&parent, DiscountCode::new("BULK")?, Some(5), Timestamp::now())?;

        assert_eq!(child.usage_limit, Some(5));

        Ok(())
    }
}
