//! Discount fixtures.

use jiff::{Span, Timestamp};
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::conditions::{ConditionKind, ConditionOperator};
use crate::rules::Allocation;

/// Wrapper for discounts in YAML
#[derive(Debug, Deserialize)]
pub struct DiscountsFixture {
    /// Map of discount key -> discount fixture
    pub discounts: FxHashMap<String, DiscountFixture>,
}

/// Discount Fixture
#[derive(Debug, Deserialize)]
pub struct DiscountFixture {
    /// Redemption code, normalized on load
    pub code: String,

    /// The rule describing what the discount takes off
    pub rule: RuleFixture,

    /// Whether the discount is a dynamic template
    #[serde(default)]
    pub is_dynamic: bool,

    /// Whether the discount is disabled
    #[serde(default)]
    pub is_disabled: bool,

    /// Start of the validity window
    #[serde(default)]
    pub starts_at: Option<Timestamp>,

    /// End of the validity window
    #[serde(default)]
    pub ends_at: Option<Timestamp>,

    /// Lifetime granted to dynamic child codes (e.g., "P30D")
    #[serde(default)]
    pub valid_duration: Option<Span>,

    /// Maximum number of redemptions
    #[serde(default)]
    pub usage_limit: Option<u64>,

    /// Region keys the discount is restricted to
    #[serde(default)]
    pub regions: Vec<String>,
}

/// Rule Fixture
#[derive(Debug, Deserialize)]
pub struct RuleFixture {
    /// Human readable description
    pub description: String,

    /// The discount value, tagged by `type`
    #[serde(flatten)]
    pub value: RuleValueFixture,

    /// How the value spreads across an order
    pub allocation: Allocation,

    /// Conditions limiting which lines and customers qualify
    #[serde(default)]
    pub conditions: Vec<ConditionFixture>,
}

/// Rule value fixture, tagged by `type`
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleValueFixture {
    /// Percentage points off (e.g., 10 for 10%)
    Percentage {
        /// Percentage points in `0..=100`
        value: u16,
    },

    /// Fixed amount off as a price string (e.g., "5.00 USD")
    Fixed {
        /// The price string
        value: String,
    },
}

/// Condition Fixture
#[derive(Debug, Deserialize)]
pub struct ConditionFixture {
    /// Which catalog resource the condition inspects
    pub resource: ConditionKind,

    /// Whether listed ids are admitted or excluded
    pub operator: ConditionOperator,

    /// Keys into the catalog fixture
    pub ids: Vec<String>,
}
