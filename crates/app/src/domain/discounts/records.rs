//! Discount Records

use jiff::Timestamp;
use redeem::{discounts::Discount, rules::RuleKind};

/// Discount Record
#[derive(Debug, Clone)]
pub struct DiscountRecord {
    /// The stored discount model.
    pub discount: Discount,

    /// When the discount was created.
    pub created_at: Timestamp,

    /// When the discount was last updated.
    pub updated_at: Timestamp,

    /// When the discount was soft-deleted, when it has been.
    pub deleted_at: Option<Timestamp>,
}

/// Search filter over stored discounts. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct DiscountFilter {
    /// Case-insensitive substring of the code.
    pub q: Option<String>,

    /// Only dynamic templates, or only ordinary discounts.
    pub is_dynamic: Option<bool>,

    /// Only disabled discounts, or only enabled ones.
    pub is_disabled: Option<bool>,

    /// Only discounts whose rule value has this kind.
    pub rule_kind: Option<RuleKind>,
}

impl DiscountFilter {
    /// Whether a discount passes every set field of the filter.
    #[must_use]
    pub fn matches(&self, discount: &Discount) -> bool {
        let code_matches = self
            .q
            .as_deref()
            .is_none_or(|q| discount.code.as_str().to_lowercase().contains(&q.to_lowercase()));

        code_matches
            && self.is_dynamic.is_none_or(|value| discount.is_dynamic == value)
            && self.is_disabled.is_none_or(|value| discount.is_disabled == value)
            && self
                .rule_kind
                .is_none_or(|kind| discount.rule.value().kind() == kind)
    }
}
