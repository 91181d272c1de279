//! Discount conditions.
//!
//! A condition restricts a rule to a set of catalog or customer resources.
//! The resource types are a closed set: matching is an exhaustive `match`
//! over [`ConditionScope`], not a lookup keyed by strings, so an unhandled
//! resource type is a compile error rather than a silent pass.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    catalog::{CollectionUuid, CustomerGroupUuid, ProductTagUuid, ProductTypeUuid, ProductUuid},
    ids::TypedUuid,
    orders::LineItem,
    validation::ValidationError,
};

/// How a condition's id set is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    /// The line or customer must reference at least one id in the set.
    In,

    /// The line or customer must reference no id in the set.
    NotIn,
}

impl ConditionOperator {
    /// The wire spelling of the operator.
    #[must_use]
    pub const fn to_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::NotIn => "not_in",
        }
    }

    /// Applies the operator to a membership test result.
    const fn admits(self, member: bool) -> bool {
        match self {
            Self::In => member,
            Self::NotIn => !member,
        }
    }
}

impl Display for ConditionOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.to_str())
    }
}

impl FromStr for ConditionOperator {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Self::In),
            "not_in" => Ok(Self::NotIn),
            other => Err(ValidationError::UnknownEnumValue {
                field: "operator",
                value: other.to_string(),
            }),
        }
    }
}

/// The resource type a condition ranges over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    /// Specific products by id.
    Products,

    /// Product classifications.
    ProductTypes,

    /// Product tags.
    ProductTags,

    /// Curated product collections.
    ProductCollections,

    /// Customer segments.
    CustomerGroups,
}

impl ConditionKind {
    /// The wire spelling of the resource type.
    #[must_use]
    pub const fn to_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::ProductTypes => "product_types",
            Self::ProductTags => "product_tags",
            Self::ProductCollections => "product_collections",
            Self::CustomerGroups => "customer_groups",
        }
    }
}

impl Display for ConditionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.to_str())
    }
}

impl FromStr for ConditionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "products" => Ok(Self::Products),
            "product_types" => Ok(Self::ProductTypes),
            "product_tags" => Ok(Self::ProductTags),
            "product_collections" => Ok(Self::ProductCollections),
            "customer_groups" => Ok(Self::CustomerGroups),
            other => Err(ValidationError::UnknownEnumValue {
                field: "type",
                value: other.to_string(),
            }),
        }
    }
}

/// The id set a condition ranges over, keyed by resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "resource", content = "ids", rename_all = "snake_case")]
pub enum ConditionScope {
    /// Specific products.
    Products(FxHashSet<ProductUuid>),
    /// Products of these types.
    ProductTypes(FxHashSet<ProductTypeUuid>),
    /// Products carrying any of these tags.
    ProductTags(FxHashSet<ProductTagUuid>),
    /// Products in these collections.
    ProductCollections(FxHashSet<CollectionUuid>),
    /// Customers belonging to any of these groups.
    CustomerGroups(FxHashSet<CustomerGroupUuid>),
}

impl ConditionScope {
    /// Returns the resource type this scope ranges over.
    #[must_use]
    pub const fn kind(&self) -> ConditionKind {
        match self {
            Self::Products(_) => ConditionKind::Products,
            Self::ProductTypes(_) => ConditionKind::ProductTypes,
            Self::ProductTags(_) => ConditionKind::ProductTags,
            Self::ProductCollections(_) => ConditionKind::ProductCollections,
            Self::CustomerGroups(_) => ConditionKind::CustomerGroups,
        }
    }
}

/// One condition attached to a discount rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountCondition {
    /// Stable identity of the condition, used for merge-by-id updates.
    pub uuid: ConditionUuid,
    /// How the id set is interpreted.
    pub operator: ConditionOperator,
    /// The id set and its resource type.
    pub scope: ConditionScope,
}

pub type ConditionUuid = TypedUuid<DiscountCondition>;

impl DiscountCondition {
    /// Creates a condition with a fresh identity.
    #[must_use]
    pub fn new(operator: ConditionOperator, scope: ConditionScope) -> Self {
        Self::with_uuid(Uuid::now_v7().into(), operator, scope)
    }

    /// Creates a condition with a caller-supplied identity.
    #[must_use]
    pub const fn with_uuid(
        uuid: ConditionUuid,
        operator: ConditionOperator,
        scope: ConditionScope,
    ) -> Self {
        Self {
            uuid,
            operator,
            scope,
        }
    }

    /// Whether a line item satisfies this condition.
    ///
    /// Product-facing scopes test the line's product and its resolved facts.
    /// A product with no type never satisfies an `in` condition over types
    /// and always satisfies a `not_in` one; collections behave the same way.
    /// Customer-group conditions are neutral here; they gate the discount as
    /// a whole via [`DiscountCondition::matches_customer`].
    #[must_use]
    pub fn matches_line_item(&self, line: &LineItem<'_>) -> bool {
        match &self.scope {
            ConditionScope::Products(ids) => self.operator.admits(ids.contains(&line.product())),
            ConditionScope::ProductTypes(ids) => self.operator.admits(
                line.facts()
                    .product_type
                    .is_some_and(|product_type| ids.contains(&product_type)),
            ),
            ConditionScope::ProductTags(ids) => self
                .operator
                .admits(line.facts().tags.iter().any(|tag| ids.contains(tag))),
            ConditionScope::ProductCollections(ids) => self.operator.admits(
                line.facts()
                    .collection
                    .is_some_and(|collection| ids.contains(&collection)),
            ),
            ConditionScope::CustomerGroups(_) => true,
        }
    }

    /// Whether a customer, described by their group memberships, satisfies
    /// this condition. All scopes other than customer groups are neutral.
    #[must_use]
    pub fn matches_customer(&self, groups: &FxHashSet<CustomerGroupUuid>) -> bool {
        match &self.scope {
            ConditionScope::CustomerGroups(ids) => self
                .operator
                .admits(groups.iter().any(|group| ids.contains(group))),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::GBP};

    use crate::catalog::{ProductFacts, ProductTagUuid};

    use super::*;

    fn product() -> ProductUuid {
        Uuid::now_v7().into()
    }

    fn plain_line(product: ProductUuid) -> LineItem<'static> {
        LineItem::new(product, Money::from_minor(100, GBP), 1)
    }

    fn tagged_line(tags: impl IntoIterator<Item = ProductTagUuid>) -> LineItem<'static> {
        let facts = ProductFacts {
            tags: tags.into_iter().collect(),
            ..ProductFacts::bare()
        };
        LineItem::with_facts(product(), facts, Money::from_minor(100, GBP), 1)
    }

    #[test]
    fn in_products_matches_membership() {
        let wanted = product();
        let other = product();
        let condition = DiscountCondition::new(
            ConditionOperator::In,
            ConditionScope::Products([wanted].into_iter().collect()),
        );

        assert!(condition.matches_line_item(&plain_line(wanted)));
        assert!(!condition.matches_line_item(&plain_line(other)));
    }

    #[test]
    fn not_in_products_excludes_membership() {
        let banned = product();
        let other = product();
        let condition = DiscountCondition::new(
            ConditionOperator::NotIn,
            ConditionScope::Products([banned].into_iter().collect()),
        );

        assert!(!condition.matches_line_item(&plain_line(banned)));
        assert!(condition.matches_line_item(&plain_line(other)));
    }

    #[test]
    fn untyped_product_never_satisfies_in_over_types() {
        let apparel: ProductTypeUuid = Uuid::now_v7().into();
        let condition = DiscountCondition::new(
            ConditionOperator::In,
            ConditionScope::ProductTypes([apparel].into_iter().collect()),
        );

        assert!(!condition.matches_line_item(&plain_line(product())));
    }

    #[test]
    fn untyped_product_always_satisfies_not_in_over_types() {
        let apparel: ProductTypeUuid = Uuid::now_v7().into();
        let condition = DiscountCondition::new(
            ConditionOperator::NotIn,
            ConditionScope::ProductTypes([apparel].into_iter().collect()),
        );

        assert!(condition.matches_line_item(&plain_line(product())));
    }

    #[test]
    fn tags_match_on_any_intersection() {
        let sale: ProductTagUuid = Uuid::now_v7().into();
        let new_season: ProductTagUuid = Uuid::now_v7().into();
        let unrelated: ProductTagUuid = Uuid::now_v7().into();
        let condition = DiscountCondition::new(
            ConditionOperator::In,
            ConditionScope::ProductTags([sale, new_season].into_iter().collect()),
        );

        assert!(condition.matches_line_item(&tagged_line([unrelated, sale])));
        assert!(!condition.matches_line_item(&tagged_line([unrelated])));
        assert!(!condition.matches_line_item(&tagged_line([])));
    }

    #[test]
    fn not_in_tags_requires_disjoint_sets() {
        let clearance: ProductTagUuid = Uuid::now_v7().into();
        let condition = DiscountCondition::new(
            ConditionOperator::NotIn,
            ConditionScope::ProductTags([clearance].into_iter().collect()),
        );

        assert!(condition.matches_line_item(&tagged_line([])));
        assert!(!condition.matches_line_item(&tagged_line([clearance])));
    }

    #[test]
    fn collection_membership_follows_operator() {
        let summer: CollectionUuid = Uuid::now_v7().into();
        let facts = ProductFacts {
            collection: Some(summer),
            ..ProductFacts::bare()
        };
        let line = LineItem::with_facts(product(), facts, Money::from_minor(100, GBP), 1);
        let condition = DiscountCondition::new(
            ConditionOperator::In,
            ConditionScope::ProductCollections([summer].into_iter().collect()),
        );

        assert!(condition.matches_line_item(&line));
        assert!(!condition.matches_line_item(&plain_line(product())));
    }

    #[test]
    fn customer_group_conditions_are_neutral_for_lines() {
        let vip: CustomerGroupUuid = Uuid::now_v7().into();
        let condition = DiscountCondition::new(
            ConditionOperator::In,
            ConditionScope::CustomerGroups([vip].into_iter().collect()),
        );

        assert!(condition.matches_line_item(&plain_line(product())));
    }

    #[test]
    fn customer_group_conditions_gate_customers() {
        let vip: CustomerGroupUuid = Uuid::now_v7().into();
        let staff: CustomerGroupUuid = Uuid::now_v7().into();
        let condition = DiscountCondition::new(
            ConditionOperator::In,
            ConditionScope::CustomerGroups([vip].into_iter().collect()),
        );

        let vip_member: FxHashSet<CustomerGroupUuid> = [staff, vip].into_iter().collect();
        let outsider: FxHashSet<CustomerGroupUuid> = [staff].into_iter().collect();

        assert!(condition.matches_customer(&vip_member));
        assert!(!condition.matches_customer(&outsider));
    }

    #[test]
    fn product_conditions_are_neutral_for_customers() {
        let condition = DiscountCondition::new(
            ConditionOperator::In,
            ConditionScope::Products([product()].into_iter().collect()),
        );

        assert!(condition.matches_customer(&FxHashSet::default()));
    }

    #[test]
    fn operator_parses_from_wire_names() -> testresult::TestResult {
        assert_eq!("in".parse::<ConditionOperator>()?, ConditionOperator::In);
        assert_eq!(
            "not_in".parse::<ConditionOperator>()?,
            ConditionOperator::NotIn
        );

        let err = "between".parse::<ConditionOperator>().err();
        assert!(matches!(
            err,
            Some(ValidationError::UnknownEnumValue { field: "operator", .. })
        ));

        Ok(())
    }

    #[test]
    fn kind_parses_from_wire_names() -> testresult::TestResult {
        assert_eq!(
            "product_collections".parse::<ConditionKind>()?,
            ConditionKind::ProductCollections
        );

        let err = "variants".parse::<ConditionKind>().err();
        assert!(matches!(
            err,
            Some(ValidationError::UnknownEnumValue { field: "type", .. })
        ));

        Ok(())
    }
}
