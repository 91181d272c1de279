//! Test Helpers

use jiff::Timestamp;
use redeem::{
    catalog::ProductUuid,
    rules::{Allocation, RuleValue},
    validity::ApplicationContext,
};
use rustc_hash::FxHashSet;
use uuid::Uuid;

use crate::domain::discounts::data::{NewDiscount, OrderDraft, OrderLineDraft, RuleDraft};

/// A total-allocated percentage discount with no conditions or regions.
pub(crate) fn percent_discount(code: &str, percentage: u16) -> NewDiscount {
    new_discount(
        code,
        RuleDraft {
            description: format!("{percentage}% off"),
            value: RuleValue::PercentageOff { percentage },
            allocation: Allocation::Total,
            conditions: Vec::new(),
        },
    )
}

/// A total-allocated fixed discount with no conditions or regions.
pub(crate) fn fixed_discount(code: &str, amount: u64) -> NewDiscount {
    new_discount(
        code,
        RuleDraft {
            description: format!("{amount} minor units off"),
            value: RuleValue::AmountOff { amount },
            allocation: Allocation::Total,
            conditions: Vec::new(),
        },
    )
}

fn new_discount(code: &str, rule: RuleDraft) -> NewDiscount {
    NewDiscount {
        code: code.to_string(),
        rule,
        is_dynamic: false,
        is_disabled: false,
        starts_at: None,
        ends_at: None,
        valid_duration: None,
        usage_limit: None,
        regions: FxHashSet::default(),
    }
}

/// A context for an anonymous customer, now, in a region nothing is fenced to.
pub(crate) fn anonymous_context() -> ApplicationContext {
    ApplicationContext::new(Timestamp::now(), Uuid::now_v7().into())
}

/// A one-line USD order draft.
pub(crate) fn single_line_order(
    product: ProductUuid,
    unit_price: u64,
    quantity: u32,
) -> OrderDraft {
    OrderDraft {
        currency: "USD".to_string(),
        lines: vec![OrderLineDraft {
            product,
            unit_price,
            quantity,
        }],
    }
}
