//! Discounts Service

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rand::{Rng, distributions::Alphanumeric};
use redeem::{
    allocation::{self, AllocatedOrder},
    catalog::ProductUuid,
    conditions::DiscountCondition,
    discounts::{
        Discount, DiscountCode, DiscountUuid, validate_region_cardinality, validate_window,
    },
    dynamic,
    orders::{LineItem, Order},
    rules::DiscountRule,
    validation::ValidationError,
    validity::{self, ApplicationContext, DiscountStateError},
};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use tracing::{Span, info};

use crate::domain::discounts::{
    DiscountsServiceError,
    catalog::ProductCatalog,
    data::{
        AppliedDiscount, ConditionDraft, DiscountUpdate, DynamicCodeRequest, EvaluatedLine,
        EvaluatedOrder, NewDiscount, OrderDraft, RuleUpdate,
    },
    records::{DiscountFilter, DiscountRecord},
    regions::RegionService,
    repository::{DiscountRepository, RepositoryError},
};

/// Length of a minted dynamic child code.
const MINTED_CODE_LENGTH: usize = 16;

/// The discount engine over pluggable storage, catalog, and region
/// collaborators.
#[derive(Clone)]
pub struct DiscountEngine {
    repository: Arc<dyn DiscountRepository>,
    catalog: Arc<dyn ProductCatalog>,
    regions: Arc<dyn RegionService>,
}

impl DiscountEngine {
    /// Wires the engine to its collaborators.
    #[must_use]
    pub fn new(
        repository: Arc<dyn DiscountRepository>,
        catalog: Arc<dyn ProductCatalog>,
        regions: Arc<dyn RegionService>,
    ) -> Self {
        Self {
            repository,
            catalog,
            regions,
        }
    }

    /// Normalizes a raw code and fetches the live discount holding it.
    async fn resolve_code(&self, code: &str) -> Result<DiscountRecord, DiscountsServiceError> {
        let normalized = DiscountCode::new(code)?;

        Ok(self.repository.find_by_code(normalized.as_str()).await?)
    }
}

#[async_trait]
impl DiscountsService for DiscountEngine {
    #[tracing::instrument(
        name = "discounts.service.create_discount",
        skip(self, discount),
        fields(
            discount_uuid = tracing::field::Empty,
            code = tracing::field::Empty,
            rule_kind = tracing::field::Empty
        ),
        err
    )]
    async fn create_discount(
        &self,
        discount: NewDiscount,
    ) -> Result<DiscountRecord, DiscountsServiceError> {
        let code = DiscountCode::new(&discount.code)?;

        validate_window(discount.starts_at, discount.ends_at)?;
        validate_region_cardinality(discount.rule.value.kind(), discount.regions.len())?;

        let rule = DiscountRule::new(
            discount.rule.description,
            discount.rule.value,
            discount.rule.allocation,
            build_conditions(discount.rule.conditions),
        )?;

        self.regions
            .verify_regions(discount.regions.iter().copied().collect())
            .await?;

        let span = Span::current();

        span.record("code", tracing::field::display(&code));
        span.record("rule_kind", tracing::field::display(rule.value().kind()));

        let mut model = Discount::new(code, rule);
        model.is_dynamic = discount.is_dynamic;
        model.is_disabled = discount.is_disabled;
        model.starts_at = discount.starts_at;
        model.ends_at = discount.ends_at;
        model.valid_duration = discount.valid_duration;
        model.usage_limit = discount.usage_limit;
        model.regions = discount.regions;

        span.record("discount_uuid", tracing::field::display(model.uuid));

        let now = Timestamp::now();
        let record = DiscountRecord {
            discount: model,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let code = record.discount.code.as_str().to_string();

        let record = self
            .repository
            .insert(record)
            .await
            .map_err(|error| match error {
                RepositoryError::DuplicateCode => DiscountsServiceError::AlreadyExists { code },
                other => other.into(),
            })?;

        info!(discount_uuid = %record.discount.uuid, "created discount");

        Ok(record)
    }

    #[tracing::instrument(
        name = "discounts.service.update_discount",
        skip(self, update),
        fields(discount_uuid = %uuid),
        err
    )]
    async fn update_discount(
        &self,
        uuid: DiscountUuid,
        update: DiscountUpdate,
    ) -> Result<DiscountRecord, DiscountsServiceError> {
        let DiscountRecord {
            mut discount,
            created_at,
            deleted_at,
            ..
        } = self.repository.find_by_id(uuid).await?;

        if let Some(code) = update.code {
            discount.code = DiscountCode::new(&code)?;
        }

        if let Some(rule) = update.rule {
            discount.rule = merge_rule(discount.rule, rule)?;
        }

        if let Some(is_disabled) = update.is_disabled {
            discount.is_disabled = is_disabled;
        }

        if let Some(starts_at) = update.starts_at {
            discount.starts_at = starts_at;
        }

        if let Some(ends_at) = update.ends_at {
            discount.ends_at = ends_at;
        }

        if let Some(valid_duration) = update.valid_duration {
            discount.valid_duration = valid_duration;
        }

        if let Some(usage_limit) = update.usage_limit {
            discount.usage_limit = usage_limit;
        }

        if let Some(regions) = update.regions {
            discount.regions = regions;
        }

        validate_window(discount.starts_at, discount.ends_at)?;
        validate_region_cardinality(discount.rule.value().kind(), discount.regions.len())?;

        self.regions
            .verify_regions(discount.regions.iter().copied().collect())
            .await?;

        let record = DiscountRecord {
            discount,
            created_at,
            updated_at: Timestamp::now(),
            deleted_at,
        };

        let code = record.discount.code.as_str().to_string();

        let record = self
            .repository
            .update(record)
            .await
            .map_err(|error| match error {
                RepositoryError::DuplicateCode => DiscountsServiceError::AlreadyExists { code },
                other => other.into(),
            })?;

        info!(discount_uuid = %record.discount.uuid, "updated discount");

        Ok(record)
    }

    #[tracing::instrument(
        name = "discounts.service.soft_delete_discount",
        skip(self),
        fields(discount_uuid = %uuid),
        err
    )]
    async fn soft_delete_discount(&self, uuid: DiscountUuid) -> Result<(), DiscountsServiceError> {
        self.repository.soft_delete(uuid).await?;

        info!(discount_uuid = %uuid, "soft-deleted discount");

        Ok(())
    }

    #[tracing::instrument(
        name = "discounts.service.get_discount",
        skip(self),
        fields(discount_uuid = %uuid),
        err
    )]
    async fn get_discount(
        &self,
        uuid: DiscountUuid,
    ) -> Result<DiscountRecord, DiscountsServiceError> {
        Ok(self.repository.find_by_id(uuid).await?)
    }

    #[tracing::instrument(name = "discounts.service.get_by_code", skip(self), err)]
    async fn get_by_code(&self, code: &str) -> Result<DiscountRecord, DiscountsServiceError> {
        self.resolve_code(code).await
    }

    #[tracing::instrument(name = "discounts.service.search_discounts", skip(self, filter), err)]
    async fn search_discounts(
        &self,
        filter: DiscountFilter,
    ) -> Result<Vec<DiscountRecord>, DiscountsServiceError> {
        Ok(self.repository.search(filter).await?)
    }

    #[tracing::instrument(
        name = "discounts.service.generate_dynamic_code",
        skip(self, request),
        fields(parent_uuid = %parent, discount_uuid = tracing::field::Empty),
        err
    )]
    async fn generate_dynamic_code(
        &self,
        parent: DiscountUuid,
        request: DynamicCodeRequest,
    ) -> Result<DiscountRecord, DiscountsServiceError> {
        let parent_record = self.repository.find_by_id(parent).await?;

        let raw_code = request.code.unwrap_or_else(mint_code);
        let code = DiscountCode::new(&raw_code)?;

        let child = dynamic::derive_child(
            &parent_record.discount,
            code,
            request.usage_limit,
            Timestamp::now(),
        )?;

        Span::current().record("discount_uuid", tracing::field::display(child.uuid));

        let now = Timestamp::now();
        let record = DiscountRecord {
            discount: child,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let code = record.discount.code.as_str().to_string();

        let record = self
            .repository
            .insert(record)
            .await
            .map_err(|error| match error {
                RepositoryError::DuplicateCode => DiscountsServiceError::AlreadyExists { code },
                other => other.into(),
            })?;

        info!(
            discount_uuid = %record.discount.uuid,
            parent_uuid = %parent,
            "generated dynamic code"
        );

        Ok(record)
    }

    #[tracing::instrument(
        name = "discounts.service.evaluate_order",
        skip(self, order, codes, ctx),
        fields(code_count = codes.len(), line_count = order.lines.len()),
        err
    )]
    async fn evaluate_order(
        &self,
        order: OrderDraft,
        codes: Vec<String>,
        ctx: ApplicationContext,
    ) -> Result<EvaluatedOrder, DiscountsServiceError> {
        let currency = resolve_currency(&order.currency)?;

        let mut discounts = Vec::with_capacity(codes.len());

        for code in &codes {
            let record = self.resolve_code(code).await?;
            discounts.push(record.discount);
        }

        for discount in &discounts {
            validity::validate(discount, &ctx).map_err(|reason| {
                DiscountsServiceError::NotApplicable {
                    code: discount.code.as_str().to_string(),
                    reason,
                }
            })?;
        }

        let products: Vec<ProductUuid> = order.lines.iter().map(|line| line.product).collect();
        let facts = self.catalog.resolve(products).await?;

        let lines: Vec<LineItem<'static>> = order
            .lines
            .iter()
            .map(|line| {
                LineItem::with_facts(
                    line.product,
                    facts.get(&line.product).cloned().unwrap_or_default(),
                    Money::from_minor(i64::try_from(line.unit_price).unwrap_or(i64::MAX), currency),
                    line.quantity,
                )
            })
            .collect();

        let order = Order::with_lines(lines, currency)?;
        let allocated = allocation::apply(&order, &discounts)?;

        let evaluated = map_evaluated(&allocated);

        info!(
            subtotal = evaluated.subtotal,
            total = evaluated.total,
            "evaluated order"
        );

        Ok(evaluated)
    }

    #[tracing::instrument(
        name = "discounts.service.register_redemption",
        skip(self, ctx),
        fields(discount_uuid = tracing::field::Empty),
        err
    )]
    async fn register_redemption(
        &self,
        code: &str,
        ctx: ApplicationContext,
    ) -> Result<u64, DiscountsServiceError> {
        let record = self.resolve_code(code).await?;
        let discount = record.discount;

        Span::current().record("discount_uuid", tracing::field::display(discount.uuid));

        validity::validate(&discount, &ctx).map_err(|reason| {
            DiscountsServiceError::NotApplicable {
                code: discount.code.as_str().to_string(),
                reason,
            }
        })?;

        let count = self
            .repository
            .increment_usage(discount.uuid)
            .await
            .map_err(|error| match error {
                RepositoryError::UsageExhausted => DiscountsServiceError::NotApplicable {
                    code: discount.code.as_str().to_string(),
                    reason: DiscountStateError::UsageLimitExceeded,
                },
                other => other.into(),
            })?;

        info!(discount_uuid = %discount.uuid, usage_count = count, "registered redemption");

        Ok(count)
    }

    #[tracing::instrument(
        name = "discounts.service.release_redemption",
        skip(self),
        fields(discount_uuid = tracing::field::Empty),
        err
    )]
    async fn release_redemption(&self, code: &str) -> Result<u64, DiscountsServiceError> {
        let record = self.resolve_code(code).await?;

        Span::current().record("discount_uuid", tracing::field::display(record.discount.uuid));

        let count = self.repository.release_usage(record.discount.uuid).await?;

        info!(
            discount_uuid = %record.discount.uuid,
            usage_count = count,
            "released redemption"
        );

        Ok(count)
    }
}

/// Discount lifecycle, lookup, and evaluation operations.
#[automock]
#[async_trait]
pub trait DiscountsService: Send + Sync {
    /// Validates and stores a new discount.
    async fn create_discount(
        &self,
        discount: NewDiscount,
    ) -> Result<DiscountRecord, DiscountsServiceError>;

    /// Applies a partial update and re-validates the merged discount.
    async fn update_discount(
        &self,
        uuid: DiscountUuid,
        update: DiscountUpdate,
    ) -> Result<DiscountRecord, DiscountsServiceError>;

    /// Marks a discount deleted, freeing its code for reuse.
    async fn soft_delete_discount(&self, uuid: DiscountUuid) -> Result<(), DiscountsServiceError>;

    /// Fetches a discount by id.
    async fn get_discount(
        &self,
        uuid: DiscountUuid,
    ) -> Result<DiscountRecord, DiscountsServiceError>;

    /// Fetches a discount by code, normalizing the lookup first.
    async fn get_by_code(&self, code: &str) -> Result<DiscountRecord, DiscountsServiceError>;

    /// All live discounts matching the filter, oldest first.
    async fn search_discounts(
        &self,
        filter: DiscountFilter,
    ) -> Result<Vec<DiscountRecord>, DiscountsServiceError>;

    /// Derives and stores a child code from a dynamic parent.
    async fn generate_dynamic_code(
        &self,
        parent: DiscountUuid,
        request: DynamicCodeRequest,
    ) -> Result<DiscountRecord, DiscountsServiceError>;

    /// Prices an order with the given codes applied. Consumes nothing.
    async fn evaluate_order(
        &self,
        order: OrderDraft,
        codes: Vec<String>,
        ctx: ApplicationContext,
    ) -> Result<EvaluatedOrder, DiscountsServiceError>;

    /// Consumes one redemption of the code. Returns the new usage count.
    async fn register_redemption(
        &self,
        code: &str,
        ctx: ApplicationContext,
    ) -> Result<u64, DiscountsServiceError>;

    /// Gives one redemption back after an abandoned checkout. Returns the
    /// new usage count.
    async fn release_redemption(&self, code: &str) -> Result<u64, DiscountsServiceError>;
}

/// Materializes condition drafts, minting identities where absent.
fn build_conditions(drafts: Vec<ConditionDraft>) -> Vec<DiscountCondition> {
    drafts
        .into_iter()
        .map(|draft| match draft.uuid {
            Some(uuid) => DiscountCondition::with_uuid(uuid, draft.operator, draft.scope),
            None => DiscountCondition::new(draft.operator, draft.scope),
        })
        .collect()
}

/// Folds a rule update into a stored rule, preserving the rule's identity.
fn merge_rule(rule: DiscountRule, update: RuleUpdate) -> Result<DiscountRule, ValidationError> {
    let description = update
        .description
        .unwrap_or_else(|| rule.description().to_string());
    let value = update.value.unwrap_or(rule.value());
    let allocation = update.allocation.unwrap_or(rule.allocation());

    let conditions = match update.conditions {
        Some(drafts) => merge_conditions(rule.conditions(), drafts)?,
        None => rule.conditions().to_vec(),
    };

    DiscountRule::with_uuid(rule.uuid(), description, value, allocation, conditions)
}

/// Merges condition drafts into an existing set by identity: drafts with a
/// uuid replace that condition, drafts without one append.
fn merge_conditions(
    existing: &[DiscountCondition],
    drafts: Vec<ConditionDraft>,
) -> Result<Vec<DiscountCondition>, ValidationError> {
    let mut merged = existing.to_vec();

    for draft in drafts {
        match draft.uuid {
            Some(uuid) => {
                let slot = merged
                    .iter_mut()
                    .find(|condition| condition.uuid == uuid)
                    .ok_or(ValidationError::ConditionNotFound(uuid))?;

                slot.operator = draft.operator;
                slot.scope = draft.scope;
            }
            None => merged.push(DiscountCondition::new(draft.operator, draft.scope)),
        }
    }

    Ok(merged)
}

/// Mints a random child code.
fn mint_code() -> String {
    let raw: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(MINTED_CODE_LENGTH)
        .map(char::from)
        .collect();

    raw.to_uppercase()
}

fn resolve_currency(code: &str) -> Result<&'static Currency, DiscountsServiceError> {
    match code.trim().to_uppercase().as_str() {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(DiscountsServiceError::UnknownCurrency(other.to_string())),
    }
}

/// Flattens an allocated order into the plain minor-unit read model.
fn map_evaluated(allocated: &AllocatedOrder<'_>) -> EvaluatedOrder {
    let lines = allocated
        .lines()
        .iter()
        .map(|line| EvaluatedLine {
            product: line.item().product(),
            quantity: line.item().quantity(),
            subtotal: unsigned_minor(line.original_total().to_minor_units()),
            discount_total: unsigned_minor(line.discount_total().to_minor_units()),
            total: unsigned_minor(line.final_total().to_minor_units()),
            applied: line
                .applications()
                .iter()
                .map(|application| AppliedDiscount {
                    code: application.code().as_str().to_string(),
                    amount: unsigned_minor(application.amount().to_minor_units()),
                })
                .collect(),
        })
        .collect();

    EvaluatedOrder {
        currency: allocated.currency().iso_alpha_code.to_string(),
        subtotal: unsigned_minor(allocated.subtotal().to_minor_units()),
        discount_total: unsigned_minor(allocated.discount_total().to_minor_units()),
        total: unsigned_minor(allocated.total().to_minor_units()),
        lines,
    }
}

/// Allocation never takes a total negative, so the clamp is a no-op.
fn unsigned_minor(minor: i64) -> u64 {
    u64::try_from(minor).unwrap_or(0)
}
