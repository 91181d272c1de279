//! In-memory collaborators backing tests and the CLI.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use jiff::Timestamp;
use redeem::{
    catalog::{ProductFacts, ProductUuid, RegionUuid},
    discounts::DiscountUuid,
};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::domain::discounts::{
    catalog::{CatalogError, ProductCatalog},
    records::{DiscountFilter, DiscountRecord},
    regions::{RegionError, RegionService},
    repository::{DiscountRepository, RepositoryError},
};

/// Discount storage over a mutex-guarded map.
#[derive(Debug, Default)]
pub struct InMemoryDiscountRepository {
    records: Mutex<FxHashMap<DiscountUuid, DiscountRecord>>,
}

impl InMemoryDiscountRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> MutexGuard<'_, FxHashMap<DiscountUuid, DiscountRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DiscountRepository for InMemoryDiscountRepository {
    async fn find_by_id(&self, uuid: DiscountUuid) -> Result<DiscountRecord, RepositoryError> {
        self.locked()
            .get(&uuid)
            .filter(|record| record.deleted_at.is_none())
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_by_code(&self, code: &str) -> Result<DiscountRecord, RepositoryError> {
        self.locked()
            .values()
            .find(|record| record.deleted_at.is_none() && record.discount.code.as_str() == code)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn insert(&self, record: DiscountRecord) -> Result<DiscountRecord, RepositoryError> {
        let mut records = self.locked();

        let duplicate = records.values().any(|existing| {
            existing.deleted_at.is_none()
                && existing.discount.code.as_str() == record.discount.code.as_str()
        });

        if duplicate {
            return Err(RepositoryError::DuplicateCode);
        }

        records.insert(record.discount.uuid, record.clone());

        Ok(record)
    }

    async fn update(&self, record: DiscountRecord) -> Result<DiscountRecord, RepositoryError> {
        let mut records = self.locked();

        let uuid = record.discount.uuid;

        let live = records
            .get(&uuid)
            .is_some_and(|existing| existing.deleted_at.is_none());

        if !live {
            return Err(RepositoryError::NotFound);
        }

        let duplicate = records.values().any(|existing| {
            existing.discount.uuid != uuid
                && existing.deleted_at.is_none()
                && existing.discount.code.as_str() == record.discount.code.as_str()
        });

        if duplicate {
            return Err(RepositoryError::DuplicateCode);
        }

        records.insert(uuid, record.clone());

        Ok(record)
    }

    async fn soft_delete(&self, uuid: DiscountUuid) -> Result<(), RepositoryError> {
        let mut records = self.locked();

        let record = records.get_mut(&uuid).ok_or(RepositoryError::NotFound)?;

        if record.deleted_at.is_none() {
            let now = Timestamp::now();
            record.deleted_at = Some(now);
            record.updated_at = now;
        }

        Ok(())
    }

    async fn increment_usage(&self, uuid: DiscountUuid) -> Result<u64, RepositoryError> {
        let mut records = self.locked();

        let record = records
            .get_mut(&uuid)
            .filter(|record| record.deleted_at.is_none())
            .ok_or(RepositoryError::NotFound)?;

        let at_limit = record
            .discount
            .usage_limit
            .is_some_and(|limit| record.discount.usage_count >= limit);

        if at_limit {
            return Err(RepositoryError::UsageExhausted);
        }

        record.discount.usage_count += 1;
        record.updated_at = Timestamp::now();

        Ok(record.discount.usage_count)
    }

    async fn release_usage(&self, uuid: DiscountUuid) -> Result<u64, RepositoryError> {
        let mut records = self.locked();

        let record = records
            .get_mut(&uuid)
            .filter(|record| record.deleted_at.is_none())
            .ok_or(RepositoryError::NotFound)?;

        record.discount.usage_count = record.discount.usage_count.saturating_sub(1);
        record.updated_at = Timestamp::now();

        Ok(record.discount.usage_count)
    }

    async fn search(&self, filter: DiscountFilter) -> Result<Vec<DiscountRecord>, RepositoryError> {
        let mut matches: Vec<DiscountRecord> = self
            .locked()
            .values()
            .filter(|record| record.deleted_at.is_none() && filter.matches(&record.discount))
            .cloned()
            .collect();

        // Version 7 uuids sort in creation order.
        matches.sort_by_key(|record| record.discount.uuid);

        Ok(matches)
    }
}

/// Product facts catalog over a mutex-guarded map.
#[derive(Debug, Default)]
pub struct InMemoryProductCatalog {
    facts: Mutex<FxHashMap<ProductUuid, ProductFacts>>,
}

impl InMemoryProductCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the facts for a product.
    pub fn put(&self, product: ProductUuid, facts: ProductFacts) {
        self.facts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(product, facts);
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn resolve(
        &self,
        products: Vec<ProductUuid>,
    ) -> Result<FxHashMap<ProductUuid, ProductFacts>, CatalogError> {
        let known = self.facts.lock().unwrap_or_else(PoisonError::into_inner);

        let mut resolved = FxHashMap::default();

        for product in products {
            let facts = known
                .get(&product)
                .cloned()
                .ok_or(CatalogError::UnknownProduct(product))?;

            resolved.insert(product, facts);
        }

        Ok(resolved)
    }
}

/// Region registry over a mutex-guarded set.
#[derive(Debug, Default)]
pub struct InMemoryRegionService {
    regions: Mutex<FxHashSet<RegionUuid>>,
}

impl InMemoryRegionService {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a region.
    pub fn put(&self, region: RegionUuid) {
        self.regions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(region);
    }
}

#[async_trait]
impl RegionService for InMemoryRegionService {
    async fn verify_regions(&self, regions: Vec<RegionUuid>) -> Result<(), RegionError> {
        let known = self.regions.lock().unwrap_or_else(PoisonError::into_inner);

        for region in regions {
            if !known.contains(&region) {
                return Err(RegionError::UnknownRegion(region));
            }
        }

        Ok(())
    }
}
