//! Fixtures

use std::{fs, path::PathBuf};

use jiff::Timestamp;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::{FxHashMap, FxHashSet};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    catalog::{
        CollectionUuid, CustomerGroupUuid, ProductFacts, ProductTagUuid, ProductTypeUuid,
        ProductUuid, RegionUuid,
    },
    conditions::{ConditionKind, ConditionScope, DiscountCondition},
    discounts::{
        Discount, DiscountCode, DiscountUuid, validate_region_cardinality, validate_window,
    },
    fixtures::{
        catalog::CatalogFixture,
        discounts::{ConditionFixture, DiscountsFixture, RuleValueFixture},
        orders::OrdersFixture,
    },
    ids::TypedUuid,
    orders::{LineItem, Order, OrderError},
    rules::{DiscountRule, RuleValue},
    validation::ValidationError,
    validity::ApplicationContext,
};

pub mod catalog;
pub mod discounts;
pub mod orders;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch within the fixture set
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Discount not found
    #[error("Discount not found: {0}")]
    DiscountNotFound(String),

    /// Order not found
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Region not found
    #[error("Region not found: {0}")]
    RegionNotFound(String),

    /// Customer group not found
    #[error("Customer group not found: {0}")]
    GroupNotFound(String),

    /// Order has no region
    #[error("Order {0} has no region; cannot build an application context")]
    NoRegion(String),

    /// No prices loaded yet
    #[error("No prices loaded yet; currency unknown")]
    NoCurrency,

    /// Invalid discount data
    #[error("Invalid discount data: {0}")]
    Discount(#[from] ValidationError),

    /// Order construction error
    #[error("Failed to build order: {0}")]
    Order(#[from] OrderError),
}

/// A resolved order fixture
#[derive(Debug, Clone)]
struct StoredOrder {
    lines: Vec<StoredLine>,
    region: Option<RegionUuid>,
    customer_groups: FxHashSet<CustomerGroupUuid>,
}

/// One resolved order line
#[derive(Debug, Clone)]
struct StoredLine {
    product: ProductUuid,
    unit_price_minor: i64,
    quantity: u32,
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// String key -> uuid mappings for catalog resources
    products: FxHashMap<String, ProductUuid>,
    product_types: FxHashMap<String, ProductTypeUuid>,
    product_tags: FxHashMap<String, ProductTagUuid>,
    collections: FxHashMap<String, CollectionUuid>,
    customer_groups: FxHashMap<String, CustomerGroupUuid>,
    regions: FxHashMap<String, RegionUuid>,

    /// Display names keyed by product, for receipts
    labels: FxHashMap<ProductUuid, String>,

    /// Resolved facts keyed by product
    facts: FxHashMap<ProductUuid, ProductFacts>,

    /// Pre-built discounts
    discounts: Vec<Discount>,
    discount_keys: FxHashMap<String, DiscountUuid>,

    /// Resolved orders
    orders: FxHashMap<String, StoredOrder>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            products: FxHashMap::default(),
            product_types: FxHashMap::default(),
            product_tags: FxHashMap::default(),
            collections: FxHashMap::default(),
            customer_groups: FxHashMap::default(),
            regions: FxHashMap::default(),
            labels: FxHashMap::default(),
            facts: FxHashMap::default(),
            discounts: Vec::new(),
            discount_keys: FxHashMap::default(),
            orders: FxHashMap::default(),
            currency: None,
        }
    }

    /// Load catalog products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_catalog(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("catalog").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CatalogFixture = serde_norway::from_str(&contents)?;

        for (key, product_fixture) in fixture.products {
            let uuid: ProductUuid = Uuid::now_v7().into();
            let mut facts = ProductFacts::bare();

            if let Some(type_key) = &product_fixture.product_type {
                facts.product_type = Some(intern(&mut self.product_types, type_key));
            }

            for tag_key in &product_fixture.tags {
                facts.tags.insert(intern(&mut self.product_tags, tag_key));
            }

            if let Some(collection_key) = &product_fixture.collection {
                facts.collection = Some(intern(&mut self.collections, collection_key));
            }

            self.labels.insert(uuid, product_fixture.name);
            self.facts.insert(uuid, facts);
            self.products.insert(key, uuid);
        }

        Ok(self)
    }

    /// Load discounts from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if a condition
    /// references a product that does not exist, or if the discount data
    /// fails validation.
    pub fn load_discounts(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("discounts").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: DiscountsFixture = serde_norway::from_str(&contents)?;

        for (key, discount_fixture) in fixture.discounts {
            let code = DiscountCode::new(&discount_fixture.code)?;
            let value = self.resolve_value(&discount_fixture.rule.value)?;

            let mut conditions = Vec::with_capacity(discount_fixture.rule.conditions.len());

            for condition in &discount_fixture.rule.conditions {
                let scope = self.resolve_scope(condition)?;

                conditions.push(DiscountCondition::new(condition.operator, scope));
            }

            let rule = DiscountRule::new(
                discount_fixture.rule.description,
                value,
                discount_fixture.rule.allocation,
                conditions,
            )?;

            validate_window(discount_fixture.starts_at, discount_fixture.ends_at)?;

            let regions: FxHashSet<RegionUuid> = discount_fixture
                .regions
                .iter()
                .map(|region| intern(&mut self.regions, region))
                .collect();

            validate_region_cardinality(rule.value().kind(), regions.len())?;

            let mut discount = Discount::new(code, rule);

            discount.is_dynamic = discount_fixture.is_dynamic;
            discount.is_disabled = discount_fixture.is_disabled;
            discount.valid_duration = discount_fixture.valid_duration;
            discount.starts_at = discount_fixture.starts_at;
            discount.ends_at = discount_fixture.ends_at;
            discount.usage_limit = discount_fixture.usage_limit;
            discount.regions = regions;

            self.discount_keys.insert(key, discount.uuid);
            self.discounts.push(discount);
        }

        Ok(self)
    }

    /// Load orders from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if a line
    /// references a product that does not exist, or if line prices disagree
    /// on currency.
    pub fn load_orders(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("orders").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: OrdersFixture = serde_norway::from_str(&contents)?;

        for (key, order_fixture) in fixture.orders {
            let mut lines = Vec::with_capacity(order_fixture.lines.len());

            for line in &order_fixture.lines {
                let product = self.product_uuid(&line.product)?;
                let (unit_price_minor, currency) = parse_price(&line.unit_price)?;

                self.note_currency(currency)?;

                lines.push(StoredLine {
                    product,
                    unit_price_minor,
                    quantity: line.quantity,
                });
            }

            let region = order_fixture
                .region
                .as_deref()
                .map(|region| intern(&mut self.regions, region));

            let customer_groups = order_fixture
                .customer_groups
                .iter()
                .map(|group| intern(&mut self.customer_groups, group))
                .collect();

            self.orders.insert(
                key,
                StoredOrder {
                    lines,
                    region,
                    customer_groups,
                },
            );
        }

        Ok(self)
    }

    /// Load a complete fixture set (catalog, discounts, and orders with the
    /// same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture
            .load_catalog(name)?
            .load_discounts(name)?
            .load_orders(name)?;

        Ok(fixture)
    }

    /// Get a product uuid by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product_uuid(&self, key: &str) -> Result<ProductUuid, FixtureError> {
        self.products
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get a region uuid by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if no loaded discount or order mentioned the region.
    pub fn region_uuid(&self, key: &str) -> Result<RegionUuid, FixtureError> {
        self.regions
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::RegionNotFound(key.to_string()))
    }

    /// Get a customer group uuid by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if no loaded discount or order mentioned the group.
    pub fn group_uuid(&self, key: &str) -> Result<CustomerGroupUuid, FixtureError> {
        self.customer_groups
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::GroupNotFound(key.to_string()))
    }

    /// Get a discount by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the discount is not found.
    pub fn discount(&self, key: &str) -> Result<&Discount, FixtureError> {
        let uuid = self
            .discount_keys
            .get(key)
            .ok_or_else(|| FixtureError::DiscountNotFound(key.to_string()))?;

        self.discounts
            .iter()
            .find(|discount| discount.uuid == *uuid)
            .ok_or_else(|| FixtureError::DiscountNotFound(key.to_string()))
    }

    /// Get all discounts
    pub fn discounts(&self) -> &[Discount] {
        &self.discounts
    }

    /// Get the receipt labels keyed by product
    pub fn labels(&self) -> &FxHashMap<ProductUuid, String> {
        &self.labels
    }

    /// Get the resolved product facts keyed by product
    pub fn facts(&self) -> &FxHashMap<ProductUuid, ProductFacts> {
        &self.facts
    }

    /// Iterate over every region uuid mentioned by loaded discounts or orders
    pub fn regions(&self) -> impl Iterator<Item = RegionUuid> + '_ {
        self.regions.values().copied()
    }

    /// Build an order from a loaded order fixture
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or no currency is known.
    pub fn order(&self, key: &str) -> Result<Order<'static>, FixtureError> {
        let stored = self
            .orders
            .get(key)
            .ok_or_else(|| FixtureError::OrderNotFound(key.to_string()))?;

        let currency = self.currency.ok_or(FixtureError::NoCurrency)?;

        let lines = stored.lines.iter().map(|line| {
            let facts = self.facts.get(&line.product).cloned().unwrap_or_default();

            LineItem::with_facts(
                line.product,
                facts,
                Money::from_minor(line.unit_price_minor, currency),
                line.quantity,
            )
        });

        Ok(Order::with_lines(lines, currency)?)
    }

    /// Build an application context from a loaded order fixture
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or carries no region.
    pub fn order_context(
        &self,
        key: &str,
        now: Timestamp,
    ) -> Result<ApplicationContext, FixtureError> {
        let stored = self
            .orders
            .get(key)
            .ok_or_else(|| FixtureError::OrderNotFound(key.to_string()))?;

        let region = stored
            .region
            .ok_or_else(|| FixtureError::NoRegion(key.to_string()))?;

        Ok(ApplicationContext::new(now, region)
            .with_customer_groups(stored.customer_groups.iter().copied()))
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no prices have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    /// Resolve a rule value fixture, recording the currency of fixed values
    fn resolve_value(&mut self, value: &RuleValueFixture) -> Result<RuleValue, FixtureError> {
        match value {
            RuleValueFixture::Percentage { value } => Ok(RuleValue::PercentageOff {
                percentage: *value,
            }),
            RuleValueFixture::Fixed { value } => {
                let (minor_units, currency) = parse_price(value)?;

                self.note_currency(currency)?;

                let amount = u64::try_from(minor_units)
                    .map_err(|_err| FixtureError::InvalidPrice(value.clone()))?;

                Ok(RuleValue::AmountOff { amount })
            }
        }
    }

    /// Resolve a condition fixture into a scope over interned uuids
    ///
    /// Products must already be loaded; types, tags, collections, and groups
    /// are interned on first mention.
    fn resolve_scope(
        &mut self,
        condition: &ConditionFixture,
    ) -> Result<ConditionScope, FixtureError> {
        match condition.resource {
            ConditionKind::Products => {
                let mut ids = FxHashSet::default();

                for key in &condition.ids {
                    ids.insert(self.product_uuid(key)?);
                }

                Ok(ConditionScope::Products(ids))
            }
            ConditionKind::ProductTypes => Ok(ConditionScope::ProductTypes(
                condition
                    .ids
                    .iter()
                    .map(|key| intern(&mut self.product_types, key))
                    .collect(),
            )),
            ConditionKind::ProductTags => Ok(ConditionScope::ProductTags(
                condition
                    .ids
                    .iter()
                    .map(|key| intern(&mut self.product_tags, key))
                    .collect(),
            )),
            ConditionKind::ProductCollections => Ok(ConditionScope::ProductCollections(
                condition
                    .ids
                    .iter()
                    .map(|key| intern(&mut self.collections, key))
                    .collect(),
            )),
            ConditionKind::CustomerGroups => Ok(ConditionScope::CustomerGroups(
                condition
                    .ids
                    .iter()
                    .map(|key| intern(&mut self.customer_groups, key))
                    .collect(),
            )),
        }
    }

    /// Record the currency of a parsed price, rejecting mismatches
    fn note_currency(&mut self, currency: &'static Currency) -> Result<(), FixtureError> {
        if let Some(existing) = self.currency {
            if existing == currency {
                Ok(())
            } else {
                Err(FixtureError::CurrencyMismatch(
                    existing.iso_alpha_code.to_string(),
                    currency.iso_alpha_code.to_string(),
                ))
            }
        } else {
            self.currency = Some(currency);
            Ok(())
        }
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Get or create the uuid for a fixture string key
fn intern<T>(map: &mut FxHashMap<String, TypedUuid<T>>, key: &str) -> TypedUuid<T> {
    *map.entry(key.to_string())
        .or_insert_with(|| Uuid::now_v7().into())
}

/// Parse price string (e.g., "2.99 USD") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use rusty_money::iso::USD;
    use tempfile::tempdir;
    use testresult::TestResult;

    use super::*;

    fn write_fixture(base: &Path, category: &str, name: &str, contents: &str) -> TestResult {
        let dir = base.join(category);

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    #[test]
    fn fixture_loads_catalog_discounts_and_orders() -> TestResult {
        let mut fixture = Fixture::new();

        fixture
            .load_catalog("demo")?
            .load_discounts("demo")?
            .load_orders("demo")?;

        assert_eq!(fixture.products.len(), 4);
        assert_eq!(fixture.discounts.len(), 4);
        assert_eq!(fixture.orders.len(), 3);

        let tee = fixture.product_uuid("tee")?;

        assert_eq!(fixture.labels().get(&tee).map(String::as_str), Some("Logo Tee"));
        assert_eq!(fixture.currency()?, USD);

        Ok(())
    }

    #[test]
    fn fixture_from_set_loads_all_fixtures() -> TestResult {
        let fixture = Fixture::from_set("demo")?;

        assert_eq!(fixture.products.len(), 4);
        assert_eq!(fixture.discounts().len(), 4);
        assert_eq!(fixture.orders.len(), 3);

        Ok(())
    }

    #[test]
    fn fixture_normalizes_discount_codes() -> TestResult {
        let fixture = Fixture::from_set("demo")?;
        let discount = fixture.discount("summer10")?;

        assert_eq!(discount.code.as_str(), "SUMMER10");

        Ok(())
    }

    #[test]
    fn fixture_order_builds_with_catalog_facts() -> TestResult {
        let fixture = Fixture::from_set("demo")?;
        let order = fixture.order("mixed")?;

        assert_eq!(order.len(), 3);
        assert_eq!(order.subtotal_minor(), 17_500);
        assert_eq!(order.currency(), USD);

        let first = order.get_line(0)?;

        assert!(first.facts().product_type.is_some());

        Ok(())
    }

    #[test]
    fn fixture_order_context_carries_region_and_groups() -> TestResult {
        let fixture = Fixture::from_set("demo")?;
        let now = Timestamp::UNIX_EPOCH;
        let ctx = fixture.order_context("vip", now)?;

        assert_eq!(ctx.region, fixture.region_uuid("us")?);
        assert!(ctx.customer_groups.contains(&fixture.group_uuid("new-customers")?));

        Ok(())
    }

    #[test]
    fn fixture_order_context_without_region_returns_error() -> TestResult {
        let fixture = Fixture::from_set("demo")?;
        let result = fixture.order_context("anonymous", Timestamp::UNIX_EPOCH);

        assert!(matches!(result, Err(FixtureError::NoRegion(_))));

        Ok(())
    }

    #[test]
    fn fixture_shares_region_uuids_between_discounts_and_orders() -> TestResult {
        let fixture = Fixture::from_set("demo")?;
        let us = fixture.region_uuid("us")?;

        let summer = fixture.discount("summer10")?;
        let ctx = fixture.order_context("mixed", Timestamp::UNIX_EPOCH)?;

        assert!(summer.regions.contains(&us));
        assert_eq!(ctx.region, us);

        Ok(())
    }

    #[test]
    fn fixture_product_not_found_returns_error() {
        let fixture = Fixture::new();
        let result = fixture.product_uuid("nonexistent");

        assert!(matches!(result, Err(FixtureError::ProductNotFound(_))));
    }

    #[test]
    fn fixture_discount_not_found_returns_error() {
        let fixture = Fixture::new();
        let result = fixture.discount("missing");

        assert!(matches!(result, Err(FixtureError::DiscountNotFound(_))));
    }

    #[test]
    fn fixture_order_not_found_returns_error() {
        let fixture = Fixture::new();
        let result = fixture.order("missing");

        assert!(matches!(result, Err(FixtureError::OrderNotFound(_))));
    }

    #[test]
    fn fixture_no_currency_returns_error() {
        let fixture = Fixture::new();
        let result = fixture.currency();

        assert!(matches!(result, Err(FixtureError::NoCurrency)));
    }

    #[test]
    fn fixture_rejects_currency_mismatch() -> TestResult {
        let dir = tempdir()?;

        write_fixture(
            dir.path(),
            "discounts",
            "mixed_currency",
            concat!(
                "discounts:\n",
                "  usd_off:\n",
                "    code: USDOFF\n",
                "    rule:\n",
                "      description: Five dollars off\n",
                "      type: fixed\n",
                "      value: \"5.00 USD\"\n",
                "      allocation: total\n",
                "  gbp_off:\n",
                "    code: GBPOFF\n",
                "    rule:\n",
                "      description: Five pounds off\n",
                "      type: fixed\n",
                "      value: \"5.00 GBP\"\n",
                "      allocation: total\n",
            ),
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());
        let result = fixture.load_discounts("mixed_currency");

        assert!(matches!(result, Err(FixtureError::CurrencyMismatch(_, _))));

        Ok(())
    }

    #[test]
    fn fixture_rejects_unknown_product_in_condition() -> TestResult {
        let dir = tempdir()?;

        write_fixture(
            dir.path(),
            "discounts",
            "bad_condition",
            concat!(
                "discounts:\n",
                "  targeted:\n",
                "    code: TARGETED\n",
                "    rule:\n",
                "      description: Product specific\n",
                "      type: percentage\n",
                "      value: 10\n",
                "      allocation: item\n",
                "      conditions:\n",
                "        - resource: products\n",
                "          operator: in\n",
                "          ids: [missing-product]\n",
            ),
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());
        let result = fixture.load_discounts("bad_condition");

        assert!(matches!(result, Err(FixtureError::ProductNotFound(_))));

        Ok(())
    }

    #[test]
    fn fixture_rejects_backwards_window() -> TestResult {
        let dir = tempdir()?;

        write_fixture(
            dir.path(),
            "discounts",
            "backwards",
            concat!(
                "discounts:\n",
                "  flipped:\n",
                "    code: FLIPPED\n",
                "    starts_at: \"2026-06-01T00:00:00Z\"\n",
                "    ends_at: \"2026-01-01T00:00:00Z\"\n",
                "    rule:\n",
                "      description: Window is backwards\n",
                "      type: percentage\n",
                "      value: 10\n",
                "      allocation: total\n",
            ),
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());
        let result = fixture.load_discounts("backwards");

        assert!(matches!(
            result,
            Err(FixtureError::Discount(ValidationError::InvalidWindow))
        ));

        Ok(())
    }

    #[test]
    fn fixture_rejects_fixed_discount_with_two_regions() -> TestResult {
        let dir = tempdir()?;

        write_fixture(
            dir.path(),
            "discounts",
            "two_regions",
            concat!(
                "discounts:\n",
                "  spread:\n",
                "    code: SPREAD\n",
                "    regions: [us, eu]\n",
                "    rule:\n",
                "      description: Fixed across regions\n",
                "      type: fixed\n",
                "      value: \"5.00 USD\"\n",
                "      allocation: total\n",
            ),
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());
        let result = fixture.load_discounts("two_regions");

        assert!(matches!(
            result,
            Err(FixtureError::Discount(
                ValidationError::FixedRegionCardinality
            ))
        ));

        Ok(())
    }

    #[test]
    fn fixture_rejects_duplicate_condition_pairs() -> TestResult {
        let dir = tempdir()?;

        write_fixture(
            dir.path(),
            "discounts",
            "duplicates",
            concat!(
                "discounts:\n",
                "  doubled:\n",
                "    code: DOUBLED\n",
                "    rule:\n",
                "      description: Same condition twice\n",
                "      type: percentage\n",
                "      value: 10\n",
                "      allocation: item\n",
                "      conditions:\n",
                "        - resource: product_tags\n",
                "          operator: in\n",
                "          ids: [summer]\n",
                "        - resource: product_tags\n",
                "          operator: in\n",
                "          ids: [winter]\n",
            ),
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());
        let result = fixture.load_discounts("duplicates");

        assert!(matches!(
            result,
            Err(FixtureError::Discount(
                ValidationError::DuplicateCondition { .. }
            ))
        ));

        Ok(())
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("2.99USD");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_accepts_usd_and_eur() -> TestResult {
        let (usd_minor, usd) = parse_price("1.00 USD")?;
        let (eur_minor, eur) = parse_price("2.50 EUR")?;

        assert_eq!(usd_minor, 100);
        assert_eq!(usd, USD);
        assert_eq!(eur_minor, 250);
        assert_eq!(eur, EUR);

        Ok(())
    }

    #[test]
    fn fixture_default_matches_new() {
        let fixture = Fixture::default();

        assert_eq!(fixture.base_path, PathBuf::from("./fixtures"));
        assert!(fixture.discounts.is_empty());
        assert!(fixture.orders.is_empty());
    }
}
