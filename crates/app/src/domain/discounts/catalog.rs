//! Product catalog collaborator.

use async_trait::async_trait;
use mockall::automock;
use redeem::catalog::{ProductFacts, ProductUuid};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Product Catalog Errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// An order referenced a product the catalog does not know.
    #[error("unknown product: {0}")]
    UnknownProduct(ProductUuid),
}

/// Source of the product facts conditions are evaluated against.
#[automock]
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Resolves the facts for each requested product.
    async fn resolve(
        &self,
        products: Vec<ProductUuid>,
    ) -> Result<FxHashMap<ProductUuid, ProductFacts>, CatalogError>;
}
