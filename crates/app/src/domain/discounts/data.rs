//! Discounts Data

use jiff::{Span, Timestamp};
use redeem::{
    catalog::{ProductUuid, RegionUuid},
    conditions::{ConditionOperator, ConditionScope, ConditionUuid},
    rules::{Allocation, RuleValue},
};
use rustc_hash::FxHashSet;
use serde::Serialize;

/// New Discount Data
#[derive(Debug, Clone)]
pub struct NewDiscount {
    pub code: String,
    pub rule: RuleDraft,
    pub is_dynamic: bool,
    pub is_disabled: bool,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
    pub valid_duration: Option<Span>,
    pub usage_limit: Option<u64>,
    pub regions: FxHashSet<RegionUuid>,
}

/// Rule Draft
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDraft {
    pub description: String,
    pub value: RuleValue,
    pub allocation: Allocation,
    pub conditions: Vec<ConditionDraft>,
}

/// Condition Draft. A draft with a uuid addresses an existing condition;
/// one without describes a brand new condition.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionDraft {
    pub uuid: Option<ConditionUuid>,
    pub operator: ConditionOperator,
    pub scope: ConditionScope,
}

/// Discount Update Data. Outer `None` keeps the stored value; for clearable
/// fields the inner `None` clears it.
#[derive(Debug, Clone, Default)]
pub struct DiscountUpdate {
    pub code: Option<String>,
    pub rule: Option<RuleUpdate>,
    pub is_disabled: Option<bool>,
    pub starts_at: Option<Option<Timestamp>>,
    pub ends_at: Option<Option<Timestamp>>,
    pub valid_duration: Option<Option<Span>>,
    pub usage_limit: Option<Option<u64>>,
    pub regions: Option<FxHashSet<RegionUuid>>,
}

/// Rule Update Data
#[derive(Debug, Clone, Default)]
pub struct RuleUpdate {
    pub description: Option<String>,
    pub value: Option<RuleValue>,
    pub allocation: Option<Allocation>,
    pub conditions: Option<Vec<ConditionDraft>>,
}

/// Dynamic Code Request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicCodeRequest {
    pub code: Option<String>,
    pub usage_limit: Option<u64>,
}

/// Order Draft
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub currency: String,
    pub lines: Vec<OrderLineDraft>,
}

/// Order Line Draft
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineDraft {
    pub product: ProductUuid,
    pub unit_price: u64,
    pub quantity: u32,
}

/// Evaluated Order. All amounts are in minor units of the order currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatedOrder {
    pub currency: String,
    pub subtotal: u64,
    pub discount_total: u64,
    pub total: u64,
    pub lines: Vec<EvaluatedLine>,
}

/// Evaluated Order Line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatedLine {
    pub product: ProductUuid,
    pub quantity: u32,
    pub subtotal: u64,
    pub discount_total: u64,
    pub total: u64,
    pub applied: Vec<AppliedDiscount>,
}

/// A discount's contribution to one order line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedDiscount {
    pub code: String,
    pub amount: u64,
}
