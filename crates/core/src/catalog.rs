//! References to externally owned catalog and customer resources.
//!
//! The engine never stores products, regions, or customer groups itself; it
//! only holds their identifiers and, for products, a small bundle of facts
//! resolved by the caller at evaluation time.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::ids::TypedUuid;

/// A sellable product, owned by the product catalog.
#[derive(Debug)]
pub struct Product;

/// A product classification such as "apparel" or "digital".
#[derive(Debug)]
pub struct ProductType;

/// A free-form label attached to products.
#[derive(Debug)]
pub struct ProductTag;

/// A curated grouping of products.
#[derive(Debug)]
pub struct ProductCollection;

/// A segment of customers, owned by the customer system.
#[derive(Debug)]
pub struct CustomerGroup;

/// A sales region, owned by the region system.
#[derive(Debug)]
pub struct Region;

pub type ProductUuid = TypedUuid<Product>;
pub type ProductTypeUuid = TypedUuid<ProductType>;
pub type ProductTagUuid = TypedUuid<ProductTag>;
pub type CollectionUuid = TypedUuid<ProductCollection>;
pub type CustomerGroupUuid = TypedUuid<CustomerGroup>;
pub type RegionUuid = TypedUuid<Region>;

/// Everything the condition matcher needs to know about one product.
///
/// Resolved by the caller's catalog collaborator and attached to each line
/// item before evaluation. A product with no type or collection simply
/// carries `None` there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFacts {
    /// The product's classification, when it has one.
    pub product_type: Option<ProductTypeUuid>,
    /// All tags attached to the product.
    pub tags: FxHashSet<ProductTagUuid>,
    /// The collection the product belongs to, when it belongs to one.
    pub collection: Option<CollectionUuid>,
}

impl ProductFacts {
    /// Facts for a product with no type, tags, or collection.
    #[must_use]
    pub fn bare() -> Self {
        Self::default()
    }
}
