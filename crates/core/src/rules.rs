//! Discount rules.
//!
//! A rule is the declarative half of a discount: what kind of value it
//! deducts, how that value is allocated across an order, and which
//! conditions restrict it. The arithmetic lives in [`crate::allocation`].

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    catalog::CustomerGroupUuid,
    conditions::{
        ConditionKind, ConditionOperator, ConditionScope, ConditionUuid, DiscountCondition,
    },
    ids::TypedUuid,
    orders::LineItem,
    validation::ValidationError,
};

/// The value a rule deducts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleValue {
    /// Deduct a percentage of the qualifying amount (e.g. "10% off").
    #[serde(rename = "percentage")]
    PercentageOff {
        /// Whole percentage points, at most 100.
        percentage: u16,
    },
    /// Deduct a fixed amount of minor units, per the rule's allocation.
    #[serde(rename = "fixed")]
    AmountOff {
        /// Minor units of the order currency.
        amount: u64,
    },
}

impl RuleValue {
    /// Returns the discriminant of the value.
    #[must_use]
    pub const fn kind(&self) -> RuleKind {
        match self {
            Self::PercentageOff { .. } => RuleKind::Percentage,
            Self::AmountOff { .. } => RuleKind::Fixed,
        }
    }
}

/// The kind of value a rule deducts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// A percentage of the qualifying amount.
    Percentage,

    /// A fixed amount of minor units.
    Fixed,
}

impl RuleKind {
    /// The wire spelling of the kind.
    #[must_use]
    pub const fn to_str(&self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Fixed => "fixed",
        }
    }
}

impl Display for RuleKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.to_str())
    }
}

impl FromStr for RuleKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(Self::Percentage),
            "fixed" => Ok(Self::Fixed),
            other => Err(ValidationError::UnknownEnumValue {
                field: "type",
                value: other.to_string(),
            }),
        }
    }
}

/// How a rule's value spreads over the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Allocation {
    /// One deduction against the qualifying subtotal, distributed
    /// proportionally across the qualifying lines.
    Total,
    /// An independent deduction on each qualifying line.
    Item,
}

impl Allocation {
    /// The wire spelling of the allocation.
    #[must_use]
    pub const fn to_str(&self) -> &'static str {
        match self {
            Self::Total => "total",
            Self::Item => "item",
        }
    }
}

impl Display for Allocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.to_str())
    }
}

impl FromStr for Allocation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "total" => Ok(Self::Total),
            "item" => Ok(Self::Item),
            other => Err(ValidationError::UnknownEnumValue {
                field: "allocation",
                value: other.to_string(),
            }),
        }
    }
}

/// The declarative body of a discount.
///
/// Construction and mutation preserve two invariants: a percentage value
/// never exceeds 100, and no two conditions share a resource type and
/// operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscountRule {
    uuid: RuleUuid,
    description: String,
    value: RuleValue,
    allocation: Allocation,
    conditions: Vec<DiscountCondition>,
}

pub type RuleUuid = TypedUuid<DiscountRule>;

impl DiscountRule {
    /// Creates a rule with a fresh identity.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PercentOutOfRange`] for a percentage value
    /// over 100, or [`ValidationError::DuplicateCondition`] when two
    /// conditions share a resource type and operator.
    pub fn new(
        description: impl Into<String>,
        value: RuleValue,
        allocation: Allocation,
        conditions: Vec<DiscountCondition>,
    ) -> Result<Self, ValidationError> {
        Self::with_uuid(
            Uuid::now_v7().into(),
            description,
            value,
            allocation,
            conditions,
        )
    }

    /// Creates a rule with a caller-supplied identity.
    ///
    /// # Errors
    ///
    /// Same as [`DiscountRule::new`].
    pub fn with_uuid(
        uuid: RuleUuid,
        description: impl Into<String>,
        value: RuleValue,
        allocation: Allocation,
        conditions: Vec<DiscountCondition>,
    ) -> Result<Self, ValidationError> {
        validate_value(value)?;

        let mut seen: FxHashSet<(ConditionKind, ConditionOperator)> = FxHashSet::default();
        for condition in &conditions {
            let pair = (condition.scope.kind(), condition.operator);
            if !seen.insert(pair) {
                return Err(ValidationError::DuplicateCondition {
                    operator: condition.operator,
                    kind: condition.scope.kind(),
                });
            }
        }

        Ok(Self {
            uuid,
            description: description.into(),
            value,
            allocation,
            conditions,
        })
    }

    /// Returns the rule's identity.
    pub fn uuid(&self) -> RuleUuid {
        self.uuid
    }

    /// Returns the human-readable description of the rule.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the value the rule deducts.
    pub fn value(&self) -> RuleValue {
        self.value
    }

    /// Returns how the value spreads over the order.
    pub fn allocation(&self) -> Allocation {
        self.allocation
    }

    /// Returns the conditions restricting the rule.
    pub fn conditions(&self) -> &[DiscountCondition] {
        &self.conditions
    }

    /// Replaces the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Replaces the value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PercentOutOfRange`] for a percentage value
    /// over 100.
    pub fn set_value(&mut self, value: RuleValue) -> Result<(), ValidationError> {
        validate_value(value)?;
        self.value = value;
        Ok(())
    }

    /// Replaces the allocation.
    pub fn set_allocation(&mut self, allocation: Allocation) {
        self.allocation = allocation;
    }

    /// Attaches a condition.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateCondition`] when the rule already
    /// carries a condition with the same resource type and operator.
    pub fn add_condition(&mut self, condition: DiscountCondition) -> Result<(), ValidationError> {
        let kind = condition.scope.kind();
        if self.conditions.iter().any(|existing| {
            existing.operator == condition.operator && existing.scope.kind() == kind
        }) {
            return Err(ValidationError::DuplicateCondition {
                operator: condition.operator,
                kind,
            });
        }

        self.conditions.push(condition);
        Ok(())
    }

    /// Replaces the condition with the given identity.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ConditionNotFound`] when no condition has
    /// that identity, or [`ValidationError::DuplicateCondition`] when the
    /// replacement would collide with another condition's resource type and
    /// operator.
    pub fn replace_condition(
        &mut self,
        uuid: ConditionUuid,
        operator: ConditionOperator,
        scope: ConditionScope,
    ) -> Result<(), ValidationError> {
        let index = self
            .conditions
            .iter()
            .position(|condition| condition.uuid == uuid)
            .ok_or(ValidationError::ConditionNotFound(uuid))?;

        let kind = scope.kind();
        if self.conditions.iter().any(|condition| {
            condition.uuid != uuid
                && condition.operator == operator
                && condition.scope.kind() == kind
        }) {
            return Err(ValidationError::DuplicateCondition { operator, kind });
        }

        if let Some(slot) = self.conditions.get_mut(index) {
            *slot = DiscountCondition::with_uuid(uuid, operator, scope);
        }

        Ok(())
    }

    /// Whether a line item satisfies every condition on the rule.
    ///
    /// A rule with no conditions qualifies every line.
    #[must_use]
    pub fn line_item_qualifies(&self, line: &LineItem<'_>) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition.matches_line_item(line))
    }

    /// Whether a customer, described by their group memberships, satisfies
    /// every condition on the rule.
    #[must_use]
    pub fn customer_qualifies(&self, groups: &FxHashSet<CustomerGroupUuid>) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition.matches_customer(groups))
    }
}

fn validate_value(value: RuleValue) -> Result<(), ValidationError> {
    match value {
        RuleValue::PercentageOff { percentage } if percentage > 100 => {
            Err(ValidationError::PercentOutOfRange { value: percentage })
        }
        RuleValue::PercentageOff { .. } | RuleValue::AmountOff { .. } => Ok(()),
    }
}
