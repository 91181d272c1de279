//! Test context for service-level tests.

use std::sync::Arc;

use redeem::catalog::{ProductFacts, ProductUuid, RegionUuid};
use uuid::Uuid;

use crate::{
    domain::discounts::DiscountEngine,
    memory::{InMemoryDiscountRepository, InMemoryProductCatalog, InMemoryRegionService},
};

/// A discount engine wired over fresh in-memory collaborators, with the
/// collaborators kept reachable for seeding.
pub struct TestContext {
    pub discounts: DiscountEngine,
    pub catalog: Arc<InMemoryProductCatalog>,
    pub regions: Arc<InMemoryRegionService>,
}

impl TestContext {
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryDiscountRepository::new());
        let catalog = Arc::new(InMemoryProductCatalog::new());
        let regions = Arc::new(InMemoryRegionService::new());

        let discounts = DiscountEngine::new(repository, catalog.clone(), regions.clone());

        Self {
            discounts,
            catalog,
            regions,
        }
    }

    /// Mints a region and registers it with the region service.
    pub fn region(&self) -> RegionUuid {
        let region = Uuid::now_v7().into();
        self.regions.put(region);
        region
    }

    /// Mints a product and registers its facts with the catalog.
    pub fn product(&self, facts: ProductFacts) -> ProductUuid {
        let product = Uuid::now_v7().into();
        self.catalog.put(product, facts);
        product
    }
}
