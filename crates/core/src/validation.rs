//! Shape validation.
//!
//! [`ValidationError`] is the malformed-input class: the discount, rule, or
//! condition being built is structurally wrong and retrying the same input
//! can never succeed. Inapplicability of a well-formed discount is a
//! different class, covered by [`crate::validity::DiscountStateError`].

use thiserror::Error;

use crate::conditions::{ConditionKind, ConditionOperator};

/// Errors raised while constructing or amending discount models.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A discount code was blank after trimming.
    #[error("Discount code cannot be empty")]
    EmptyCode,

    /// A percentage rule value exceeded 100.
    #[error("Percentage value must be between 0 and 100, got {value}")]
    PercentOutOfRange {
        /// The rejected value.
        value: u16,
    },

    /// A rule already carries a condition for this resource type and operator.
    #[error("A condition with operator '{operator}' and type '{kind}' already exists on this rule")]
    DuplicateCondition {
        /// The operator of the rejected condition.
        operator: ConditionOperator,
        /// The resource type of the rejected condition.
        kind: ConditionKind,
    },

    /// A condition referenced by id does not exist on the rule.
    #[error("Condition {0} does not exist on this rule")]
    ConditionNotFound(crate::conditions::ConditionUuid),

    /// A fixed-value discount was given more than one region.
    #[error("Fixed discounts can have one region")]
    FixedRegionCardinality,

    /// A validity window ended before it started.
    #[error("\"ends_at\" must be greater than \"starts_at\"")]
    InvalidWindow,

    /// A string did not name a member of one of the closed enums.
    #[error("{field} must be a valid enum value, got '{value}'")]
    UnknownEnumValue {
        /// Which field was being parsed.
        field: &'static str,
        /// The rejected input.
        value: String,
    },
}
