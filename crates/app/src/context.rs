//! Engine Context

use std::sync::Arc;

use crate::{
    domain::discounts::{DiscountEngine, DiscountsService},
    memory::{InMemoryDiscountRepository, InMemoryProductCatalog, InMemoryRegionService},
};

/// The wired service surface handed to transports and embedding callers.
#[derive(Clone)]
pub struct EngineContext {
    pub discounts: Arc<dyn DiscountsService>,
}

impl EngineContext {
    /// Build an engine context from an already-wired discounts service.
    #[must_use]
    pub fn new(discounts: Arc<dyn DiscountsService>) -> Self {
        Self { discounts }
    }

    /// Build an engine context over fresh in-memory collaborators.
    ///
    /// The catalog and region service are returned alongside so callers can
    /// seed product facts and known regions before evaluating orders.
    #[must_use]
    pub fn in_memory() -> (
        Self,
        Arc<InMemoryProductCatalog>,
        Arc<InMemoryRegionService>,
    ) {
        let repository = Arc::new(InMemoryDiscountRepository::new());
        let catalog = Arc::new(InMemoryProductCatalog::new());
        let regions = Arc::new(InMemoryRegionService::new());

        let discounts = Arc::new(DiscountEngine::new(
            repository,
            catalog.clone(),
            regions.clone(),
        ));

        (Self { discounts }, catalog, regions)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::helpers::percent_discount;

    use super::*;

    #[tokio::test]
    async fn in_memory_context_serves_discounts() -> TestResult {
        let (context, _catalog, _regions) = EngineContext::in_memory();

        let created = context
            .discounts
            .create_discount(percent_discount("WELCOME", 10))
            .await?;

        let fetched = context.discounts.get_by_code("welcome").await?;

        assert_eq!(fetched.discount.uuid, created.discount.uuid);

        Ok(())
    }
}
