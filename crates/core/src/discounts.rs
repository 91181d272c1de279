//! Discount model.
//!
//! A [`Discount`] pairs a redeemable code with a [`DiscountRule`] and the
//! bookkeeping that gates it: activity window, usage counters, region
//! attachments, and (for dynamic parents) the duration stamped onto child
//! codes. Whether a discount applies *right now* is decided in
//! [`crate::validity`]; this module only owns the shape.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::{Span, Timestamp};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    catalog::RegionUuid,
    ids::TypedUuid,
    rules::{DiscountRule, RuleKind},
    validation::ValidationError,
};

/// A redeemable discount code.
///
/// Codes are case-insensitive at the edges: construction trims surrounding
/// whitespace and uppercases, so `HELLOworld` and `helloworld` name the same
/// discount.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DiscountCode(String);

impl DiscountCode {
    /// Normalizes and validates a raw code.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyCode`] when the input is blank after
    /// trimming.
    pub fn new(code: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = code.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyCode);
        }

        Ok(Self(trimmed.to_uppercase()))
    }

    /// Returns the normalized code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DiscountCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl FromStr for DiscountCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DiscountCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DiscountCode> for String {
    fn from(value: DiscountCode) -> Self {
        value.0
    }
}

/// A discount: a code, its rule, and the state gating its redemption.
#[derive(Debug, Clone, Serialize)]
pub struct Discount {
    /// Stable identity of the discount.
    pub uuid: DiscountUuid,
    /// The normalized redeemable code.
    pub code: DiscountCode,
    /// The declarative rule the code applies.
    pub rule: DiscountRule,
    /// Whether this discount mints child codes instead of being redeemed
    /// directly.
    pub is_dynamic: bool,
    /// Disabled discounts never validate.
    pub is_disabled: bool,
    /// For dynamic parents: how long a child code stays redeemable, stamped
    /// onto the child as an absolute `ends_at` when it is minted.
    pub valid_duration: Option<Span>,
    /// Redemptions are rejected before this instant.
    pub starts_at: Option<Timestamp>,
    /// Redemptions are rejected after this instant.
    pub ends_at: Option<Timestamp>,
    /// Total redemptions allowed across all customers.
    pub usage_limit: Option<u64>,
    /// Redemptions recorded so far.
    pub usage_count: u64,
    /// Regions the discount is restricted to; empty means everywhere.
    pub regions: FxHashSet<RegionUuid>,
    /// For child codes: the dynamic parent that minted them.
    pub parent: Option<DiscountUuid>,
}

pub type DiscountUuid = TypedUuid<Discount>;

impl Discount {
    /// Creates an enabled, unrestricted discount with a fresh identity.
    #[must_use]
    pub fn new(code: DiscountCode, rule: DiscountRule) -> Self {
        Self {
            uuid: Uuid::now_v7().into(),
            code,
            rule,
            is_dynamic: false,
            is_disabled: false,
            valid_duration: None,
            starts_at: None,
            ends_at: None,
            usage_limit: None,
            usage_count: 0,
            regions: FxHashSet::default(),
            parent: None,
        }
    }
}

/// Validates an activity window.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidWindow`] when both bounds are present
/// and the end does not fall strictly after the start.
pub fn validate_window(
    starts_at: Option<Timestamp>,
    ends_at: Option<Timestamp>,
) -> Result<(), ValidationError> {
    if let (Some(starts), Some(ends)) = (starts_at, ends_at)
        && ends <= starts
    {
        return Err(ValidationError::InvalidWindow);
    }

    Ok(())
}

/// Validates the number of regions attached to a discount of the given rule
/// kind.
///
/// # Errors
///
/// Returns [`ValidationError::FixedRegionCardinality`] when a fixed-value
/// discount is attached to more than one region. A fixed amount is
/// denominated in one currency, so it cannot span regions.
pub fn validate_region_cardinality(
    kind: RuleKind,
    region_count: usize,
) -> Result<(), ValidationError> {
    if matches!(kind, RuleKind::Fixed) && region_count > 1 {
        return Err(ValidationError::FixedRegionCardinality);
    }

    Ok(())
}
