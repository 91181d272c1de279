//! Redeem prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    allocation::{AllocatedLine, AllocatedOrder, AllocationError, DiscountApplication},
    catalog::{
        CollectionUuid, CustomerGroupUuid, ProductFacts, ProductTagUuid, ProductTypeUuid,
        ProductUuid, RegionUuid,
    },
    conditions::{
        ConditionKind, ConditionOperator, ConditionScope, ConditionUuid, DiscountCondition,
    },
    discounts::{Discount, DiscountCode, DiscountUuid},
    dynamic::DynamicCodeError,
    fixtures::{Fixture, FixtureError},
    ids::TypedUuid,
    orders::{LineItem, Order, OrderError},
    receipt::ReceiptError,
    rules::{Allocation, DiscountRule, RuleKind, RuleUuid, RuleValue},
    validation::ValidationError,
    validity::{ApplicationContext, DiscountStateError},
};
